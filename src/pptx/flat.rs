//! Plain text extraction for the `flat` engine.
//!
//! No layout classification, no placeholder roles, no reading-order sort:
//! every slide is a `Content Slide` and shapes are emitted in document
//! order. Useful when the structured heuristics guess wrong for a deck, or
//! when downstream tooling wants raw text.

use crate::omml::omml_to_latex;
use crate::postprocess::finalize_document;
use crate::pptx::markdown::table_to_markdown;
use crate::pptx::model::{ShapeKind, Slide, SlideDeck};

pub(crate) fn render_flat(deck: &SlideDeck) -> String {
    let blocks: Vec<String> = deck.slides.iter().map(render_slide).collect();
    finalize_document(&blocks.join("\n\n---\n\n"))
}

fn render_slide(slide: &Slide) -> String {
    let mut lines = vec![
        format!("## Slide {}", slide.number),
        "**Type**: Content Slide".to_string(),
        String::new(),
        "### Content".to_string(),
        String::new(),
    ];

    let mut parts: Vec<String> = Vec::new();
    for shape in &slide.shapes {
        match &shape.kind {
            ShapeKind::Text(body) => {
                let text = body.full_text().trim().to_string();
                if !text.is_empty() {
                    parts.push(text);
                }
                for fragment in &body.math {
                    if let Some(latex) = omml_to_latex(fragment) {
                        parts.push(format!("$${latex}$$"));
                    }
                }
            }
            ShapeKind::Table(table) => {
                let md = table_to_markdown(table);
                if !md.is_empty() {
                    parts.push(md);
                }
            }
            ShapeKind::Picture => {}
        }
    }
    if !parts.is_empty() {
        lines.push(parts.join("\n\n"));
    }
    lines.join("\n")
}
