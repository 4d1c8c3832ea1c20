//! End-to-end PPTX conversion tests over synthetic decks.
//!
//! Decks are assembled in memory (see `common`) and fed through the public
//! [`doc2md::convert_pptx`] API, so every test exercises the full chain:
//! input resolution, package reading, classification, and rendering.

mod common;

use common::{
    deck_bytes, deck_from_parts, para, para_lvl, para_math, picture, slide_xml, table_frame,
    text_shape, text_shape_raw, write_deck, DeckSlide, NS_PKG_REL, NS_R,
};
use doc2md::{convert_pptx, Doc2MdError, PageList, PptxEngine, PptxOptions};
use tempfile::tempdir;

async fn convert_slides(slides: &[DeckSlide], options: &PptxOptions) -> String {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    write_deck(&path, slides);
    convert_pptx(path.to_str().unwrap(), options).await.unwrap()
}

#[tokio::test]
async fn title_slide_renders_the_full_header_template() {
    let shapes = format!(
        "{}{}{}",
        text_shape(Some("ctrTitle"), 365_125, &["Quarterly Review"]),
        text_shape(Some("subTitle"), 800_000, &["FY26"]),
        text_shape(None, 1_200_000, &["First point"]),
    );
    let slides = [DeckSlide::with_layout(&shapes, "Title Slide")];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert_eq!(
        markdown,
        "## Slide 1\n\
         **Type**: Title Slide\n\
         **Title**: Quarterly Review\n\
         **Subtitle**: FY26\n\
         \n\
         ### Content\n\
         \n\
         First point\n"
    );
}

#[tokio::test]
async fn layout_names_drive_slide_classification() {
    let body = |text: &str| text_shape(None, 0, &[text]);
    let slides = [
        DeckSlide::with_layout(&body("Part two"), "Section Header"),
        DeckSlide::with_layout(&body("Details"), "Title and Content"),
        DeckSlide::with_layout(&body("Quote"), "Centered Text"),
    ];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(
        markdown.contains("## Slide 1\n**Type**: Section Divider"),
        "got: {markdown}"
    );
    assert!(markdown.contains("## Slide 2\n**Type**: Content Slide"));
    assert!(markdown.contains("## Slide 3\n**Type**: Content Slide\n**Layout**: Center-aligned"));
}

#[tokio::test]
async fn shapes_engine_orders_content_by_position() {
    // Document order is Below then Above; vertical position says otherwise.
    let shapes = format!(
        "{}{}",
        text_shape(None, 2_000_000, &["Below"]),
        text_shape(None, 1_000_000, &["Above"]),
    );
    let slides = [DeckSlide::new(&shapes)];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(markdown.contains("Above\n\nBelow"), "got: {markdown}");
}

#[tokio::test]
async fn flat_engine_keeps_document_order_and_fixed_type() {
    let shapes = format!(
        "{}{}",
        text_shape(Some("ctrTitle"), 2_000_000, &["Deck Title"]),
        text_shape(None, 1_000_000, &["Body text"]),
    );
    let slides = [DeckSlide::with_layout(&shapes, "Title Slide")];
    let markdown = convert_slides(&slides, &PptxOptions::with_engine(PptxEngine::Flat)).await;

    assert!(markdown.contains("**Type**: Content Slide"));
    assert!(!markdown.contains("**Title**:"));
    // Title text still present, as plain content, before the body text.
    let title_at = markdown.find("Deck Title").unwrap();
    let body_at = markdown.find("Body text").unwrap();
    assert!(title_at < body_at, "got: {markdown}");
}

#[tokio::test]
async fn consecutive_code_paragraphs_share_one_fence() {
    let paras = format!(
        "{}{}{}{}",
        para("import os"),
        para("import sys"),
        para(""),
        para("Regular prose follows."),
    );
    let slides = [DeckSlide::new(&text_shape_raw(None, 0, &paras))];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(
        markdown.contains("```\nimport os\nimport sys\n```"),
        "got: {markdown}"
    );
    assert!(markdown.contains("Regular prose follows."));
}

#[tokio::test]
async fn indent_levels_become_nested_bullets() {
    let paras = format!(
        "{}{}{}",
        para("Top"),
        para_lvl(1, "Child"),
        para_lvl(2, "Grandchild"),
    );
    let slides = [DeckSlide::new(&text_shape_raw(None, 0, &paras))];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(
        markdown.contains("Top\n\n   - Child\n\n      - Grandchild"),
        "got: {markdown}"
    );
}

#[tokio::test]
async fn tables_render_as_pipe_markdown() {
    let shapes = table_frame(0, &[&["Name", "Role"], &["Ada", "Engineer"]]);
    let slides = [DeckSlide::new(&shapes)];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(
        markdown.contains("| Name | Role |\n| --- | --- |\n| Ada | Engineer |"),
        "got: {markdown}"
    );
}

#[tokio::test]
async fn math_islands_come_out_as_latex() {
    let shapes = text_shape_raw(None, 0, &para_math("<m:r><m:t>y=x</m:t></m:r>"));
    let slides = [DeckSlide::new(&shapes)];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(markdown.contains("$y=x$"), "got: {markdown}");
}

#[tokio::test]
async fn slides_join_with_rules_and_images_are_dropped() {
    let first = format!("{}{}", text_shape(None, 0, &["One"]), picture(500));
    let second = text_shape(None, 0, &["![chart](c.png)", "Two"]);
    let slides = [DeckSlide::new(&first), DeckSlide::new(&second)];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert!(markdown.contains("\n\n---\n\n"), "got: {markdown}");
    assert!(!markdown.contains("!["), "got: {markdown}");
    assert!(markdown.contains("Two"));
    assert!(markdown.ends_with('\n') && !markdown.ends_with("\n\n"));
}

#[tokio::test]
async fn title_text_is_not_repeated_in_content() {
    let shapes = format!(
        "{}{}{}",
        text_shape(Some("title"), 0, &["Agenda"]),
        text_shape(None, 1_000, &["Agenda"]),
        text_shape(None, 2_000, &["Items"]),
    );
    let slides = [DeckSlide::with_layout(&shapes, "Title Only")];
    let markdown = convert_slides(&slides, &PptxOptions::default()).await;

    assert_eq!(markdown.matches("Agenda").count(), 1, "got: {markdown}");
    assert!(markdown.contains("Items"));
}

#[tokio::test]
async fn slide_selection_is_ignored_for_decks() {
    let slides = [
        DeckSlide::new(&text_shape(None, 0, &["One"])),
        DeckSlide::new(&text_shape(None, 0, &["Two"])),
    ];
    let options = PptxOptions {
        slides: Some(PageList::parse("0").unwrap()),
        ..PptxOptions::default()
    };
    let markdown = convert_slides(&slides, &options).await;

    // The whole deck is converted; the selection only logs a warning.
    assert!(markdown.contains("## Slide 1"));
    assert!(markdown.contains("## Slide 2"));
}

#[tokio::test]
async fn empty_deck_converts_to_an_empty_document() {
    let markdown = convert_slides(&[], &PptxOptions::default()).await;
    assert_eq!(markdown, "");
}

#[tokio::test]
async fn broken_slide_relationship_skips_that_slide_only() {
    // rId2 is listed but never mapped; rId3 points at the only real slide.
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="{NS_R}"><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst></p:presentation>"#
    );
    let rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId3" Type="{NS_R}/slide" Target="slides/slide1.xml"/></Relationships>"#
    );
    let slide = slide_xml(&text_shape(None, 0, &["Survivor"]));
    let bytes = deck_from_parts(&[
        ("ppt/presentation.xml", &presentation),
        ("ppt/_rels/presentation.xml.rels", &rels),
        ("ppt/slides/slide1.xml", &slide),
    ]);

    let dir = tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    std::fs::write(&path, bytes).unwrap();
    let markdown = convert_pptx(path.to_str().unwrap(), &PptxOptions::default())
        .await
        .unwrap();

    // Numbering follows list position, so the survivor is slide 2.
    assert!(!markdown.contains("## Slide 1"), "got: {markdown}");
    assert!(markdown.contains("## Slide 2\n"));
    assert!(markdown.contains("Survivor"));
}

#[tokio::test]
async fn missing_file_fails_before_any_provider_check() {
    // Even the multimodal path must report the bad path, not a missing API key.
    let options = PptxOptions {
        multimodal: true,
        ..PptxOptions::default()
    };
    let err = convert_pptx("no/such/deck.pptx", &options).await.unwrap_err();
    assert!(matches!(err, Doc2MdError::FileNotFound { .. }), "{err}");
}

#[tokio::test]
async fn wrong_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deck.txt");
    std::fs::write(&path, deck_bytes(&[])).unwrap();

    let err = convert_pptx(path.to_str().unwrap(), &PptxOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Doc2MdError::WrongExtension { .. }), "{err}");
    assert!(err.to_string().contains("Expected .pptx"));
}

#[tokio::test]
async fn zip_magic_with_garbage_is_reported_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.pptx");
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    std::fs::write(&path, bytes).unwrap();

    let err = convert_pptx(path.to_str().unwrap(), &PptxOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Doc2MdError::CorruptDocument { .. }), "{err}");
}

#[tokio::test]
async fn archive_without_presentation_part_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hollow.pptx");
    let bytes = deck_from_parts(&[("docProps/core.xml", "<coreProperties/>")]);
    std::fs::write(&path, bytes).unwrap();

    let err = convert_pptx(path.to_str().unwrap(), &PptxOptions::default())
        .await
        .unwrap_err();
    match err {
        Doc2MdError::CorruptDocument { detail, .. } => {
            assert!(detail.contains("ppt/presentation.xml"), "got: {detail}");
        }
        other => panic!("expected CorruptDocument, got: {other}"),
    }
}
