//! Shared helpers for the integration tests: a minimal OPC deck writer.
//!
//! The decks are assembled in memory with the same `zip` crate the library
//! reads them with, carrying only the parts the converter touches:
//! `ppt/presentation.xml`, its relationships, one part per slide, and
//! (optionally) a slide-layout chain so classification has a name to read.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_M: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
pub const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#;

/// One slide of a synthetic deck: its part XML and an optional layout name.
pub struct DeckSlide {
    pub xml: String,
    pub layout: Option<String>,
}

impl DeckSlide {
    pub fn new(shapes_xml: &str) -> Self {
        Self {
            xml: slide_xml(shapes_xml),
            layout: None,
        }
    }

    pub fn with_layout(shapes_xml: &str, layout_name: &str) -> Self {
        Self {
            xml: slide_xml(shapes_xml),
            layout: Some(layout_name.to_string()),
        }
    }
}

/// Build a complete `.pptx` byte stream from slide specs.
pub fn deck_bytes(slides: &[DeckSlide]) -> Vec<u8> {
    let mut parts: Vec<(String, String)> = Vec::new();
    parts.push(("[Content_Types].xml".into(), CONTENT_TYPES.into()));

    let mut sld_ids = String::new();
    let mut pres_rels = String::new();
    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        let rid = format!("rId{}", n + 1);
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{rid}"/>"#, 255 + n));
        pres_rels.push_str(&format!(
            r#"<Relationship Id="{rid}" Type="{NS_R}/slide" Target="slides/slide{n}.xml"/>"#
        ));
        parts.push((format!("ppt/slides/slide{n}.xml"), slide.xml.clone()));
        if let Some(name) = &slide.layout {
            parts.push((
                format!("ppt/slides/_rels/slide{n}.xml.rels"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_R}/slideLayout" Target="../slideLayouts/slideLayout{n}.xml"/></Relationships>"#
                ),
            ));
            parts.push((
                format!("ppt/slideLayouts/slideLayout{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{NS_A}" xmlns:p="{NS_P}"><p:cSld name="{}"><p:spTree/></p:cSld></p:sldLayout>"#,
                    xml_escape(name)
                ),
            ));
        }
    }

    parts.push((
        "ppt/presentation.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="{NS_P}" xmlns:r="{NS_R}"><p:sldIdLst>{sld_ids}</p:sldIdLst></p:presentation>"#
        ),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{NS_PKG_REL}">{pres_rels}</Relationships>"#
        ),
    ));

    let refs: Vec<(&str, &str)> = parts
        .iter()
        .map(|(name, body)| (name.as_str(), body.as_str()))
        .collect();
    deck_from_parts(&refs)
}

/// Zip up arbitrary named parts. Lets tests build deliberately broken decks.
pub fn deck_from_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in parts {
        zip.start_file(name.to_string(), options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write a deck built from `slides` to `path`.
pub fn write_deck(path: &Path, slides: &[DeckSlide]) {
    std::fs::write(path, deck_bytes(slides)).unwrap();
}

/// Wrap shape XML in the slide envelope.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}

/// A text shape with optional placeholder type, a position, and simple
/// one-run paragraphs. An empty string becomes an empty paragraph.
pub fn text_shape(ph_type: Option<&str>, y: i64, texts: &[&str]) -> String {
    let paras: String = texts.iter().map(|t| para(t)).collect();
    text_shape_raw(ph_type, y, &paras)
}

/// A text shape whose paragraph XML the caller supplies verbatim.
pub fn text_shape_raw(ph_type: Option<&str>, y: i64, paragraphs_xml: &str) -> String {
    let ph = match ph_type {
        Some(t) => format!(r#"<p:ph type="{t}"/>"#),
        None => String::new(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="1" name=""/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="{y}"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{paragraphs_xml}</p:txBody></p:sp>"#
    )
}

pub fn para(text: &str) -> String {
    if text.is_empty() {
        "<a:p/>".to_string()
    } else {
        format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", xml_escape(text))
    }
}

pub fn para_lvl(level: u8, text: &str) -> String {
    format!(
        r#"<a:p><a:pPr lvl="{level}"/><a:r><a:t>{}</a:t></a:r></a:p>"#,
        xml_escape(text)
    )
}

/// A paragraph holding a single inline math island.
pub fn para_math(omml_runs: &str) -> String {
    format!(
        r#"<a:p><a14:m xmlns:a14="http://schemas.microsoft.com/office/drawing/2010/main"><m:oMath xmlns:m="{NS_M}">{omml_runs}</m:oMath></a14:m></a:p>"#
    )
}

/// A table in a graphic frame at the given position.
pub fn table_frame(y: i64, rows: &[&[&str]]) -> String {
    let mut tbl = String::new();
    for row in rows {
        tbl.push_str("<a:tr>");
        for cell in *row {
            tbl.push_str(&format!(
                "<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody></a:tc>",
                xml_escape(cell)
            ));
        }
        tbl.push_str("</a:tr>");
    }
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="9" name=""/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="{y}"/><a:ext cx="914400" cy="914400"/></p:xfrm><a:graphic><a:graphicData uri="{NS_A}/table"><a:tbl>{tbl}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

/// A picture shape at the given position.
pub fn picture(y: i64) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="7" name="chart.png"/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="{y}"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr></p:pic>"#
    )
}

pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
