//! PPTX package reader: OPC zip traversal and shape-tree parsing.
//!
//! A `.pptx` file is a zip archive of XML parts. Slide order comes from
//! `ppt/presentation.xml` (the `p:sldIdLst` relationship references), each
//! slide part carries its shape tree, and the slide's `_rels` part points at
//! the layout whose `p:cSld/@name` drives slide classification.
//!
//! Parsing is streaming (no DOM): one pass per part with depth-tracked
//! loops. Namespace prefixes are not resolved; elements are matched on
//! their local names, which is unambiguous for the parts read here. The
//! reader is deliberately lenient about missing optional parts (rels,
//! layouts) and strict about the package structure itself: a missing
//! `presentation.xml` or unreadable slide part is a corrupt document.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Error as XmlError, Reader, Writer};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::Doc2MdError;
use crate::pptx::model::{
    Paragraph, PlaceholderRole, Shape, ShapeKind, Slide, SlideDeck, Table, TextBody,
};

/// Read a `.pptx` file into a [`SlideDeck`].
pub(crate) fn read_deck(path: &Path) -> Result<SlideDeck, Doc2MdError> {
    let file = File::open(path).map_err(|e| open_error(e, path))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| corrupt(path, format!("not a valid PPTX package: {e}")))?;

    let presentation = read_part(&mut zip, path, "ppt/presentation.xml")?;
    let rels_xml = read_part(&mut zip, path, "ppt/_rels/presentation.xml.rels")?;

    let rels = parse_relationships(&rels_xml)
        .map_err(|e| corrupt(path, format!("presentation relationships: {e}")))?;
    let rid_to_target: HashMap<&str, &str> = rels
        .iter()
        .map(|r| (r.id.as_str(), r.target.as_str()))
        .collect();

    let order =
        slide_order(&presentation).map_err(|e| corrupt(path, format!("presentation.xml: {e}")))?;

    let mut layout_cache: HashMap<String, Option<String>> = HashMap::new();
    let mut slides = Vec::with_capacity(order.len());

    for (idx, rid) in order.iter().enumerate() {
        let number = idx + 1;
        let Some(target) = rid_to_target.get(rid.as_str()) else {
            warn!(slide = number, rid = %rid, "Slide relationship missing; skipping");
            continue;
        };
        let part = resolve_part("ppt", target);
        let slide_xml = read_part(&mut zip, path, &part)?;
        let shapes =
            parse_slide_shapes(&slide_xml).map_err(|e| corrupt(path, format!("{part}: {e}")))?;

        let layout_name = lookup_layout_name(&mut zip, &mut layout_cache, &part);
        debug!(
            slide = number,
            shapes = shapes.len(),
            layout = layout_name.as_deref().unwrap_or("-"),
            "Parsed slide"
        );
        slides.push(Slide {
            number,
            layout_name,
            shapes,
        });
    }

    Ok(SlideDeck { slides })
}

fn open_error(e: std::io::Error, path: &Path) -> Doc2MdError {
    match e.kind() {
        std::io::ErrorKind::NotFound => Doc2MdError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Doc2MdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => corrupt(path, e.to_string()),
    }
}

fn corrupt(path: &Path, detail: String) -> Doc2MdError {
    Doc2MdError::CorruptDocument {
        path: path.to_path_buf(),
        detail,
    }
}

// ── Part access ──────────────────────────────────────────────────────────────

fn read_part(zip: &mut ZipArchive<File>, doc: &Path, name: &str) -> Result<String, Doc2MdError> {
    let mut entry = zip
        .by_name(name)
        .map_err(|e| corrupt(doc, format!("part '{name}': {e}")))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(doc, format!("part '{name}': {e}")))?;
    Ok(strip_bom(xml))
}

fn read_part_opt(zip: &mut ZipArchive<File>, name: &str) -> Option<String> {
    let mut entry = zip.by_name(name).ok()?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).ok()?;
    Some(strip_bom(xml))
}

fn strip_bom(xml: String) -> String {
    match xml.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => xml,
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_part(base_dir: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            ".." => {
                parts.pop();
            }
            "" | "." => {}
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Layout name for a slide part, via its rels, with a per-deck cache so
/// shared layouts are parsed once.
fn lookup_layout_name(
    zip: &mut ZipArchive<File>,
    cache: &mut HashMap<String, Option<String>>,
    slide_part: &str,
) -> Option<String> {
    let (dir, file) = slide_part.rsplit_once('/')?;
    let rels_xml = read_part_opt(zip, &format!("{dir}/_rels/{file}.rels"))?;
    let rels = parse_relationships(&rels_xml).ok()?;
    let layout = rels.iter().find(|r| r.rel_type.ends_with("/slideLayout"))?;
    let layout_part = resolve_part(dir, &layout.target);

    if let Some(cached) = cache.get(&layout_part) {
        return cached.clone();
    }
    let name = read_part_opt(zip, &layout_part).and_then(|xml| parse_layout_name(&xml));
    cache.insert(layout_part, name.clone());
    name
}

// ── Relationship and presentation parts ──────────────────────────────────────

struct Relationship {
    id: String,
    target: String,
    rel_type: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_by_local(&e, b"Id").unwrap_or_default();
                let target = attr_by_local(&e, b"Target").unwrap_or_default();
                let rel_type = attr_by_local(&e, b"Type").unwrap_or_default();
                if !id.is_empty() && !target.is_empty() {
                    out.push(Relationship {
                        id,
                        target,
                        rel_type,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Relationship ids of the slides, in presentation order (`p:sldIdLst`).
fn slide_order(presentation_xml: &str) -> Result<Vec<String>, XmlError> {
    let mut reader = Reader::from_str(presentation_xml);
    let mut in_list = false;
    let mut out = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldIdLst" => in_list = true,
                b"sldId" if in_list => {
                    // The slide reference is the *prefixed* r:id attribute;
                    // sldId also carries an unprefixed id we must not confuse
                    // it with.
                    if let Some(rid) = attr_by_qname(&e, b"r:id") {
                        out.push(rid);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"sldIdLst" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// `p:cSld/@name` from a slide layout part.
fn parse_layout_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cSld" => {
                return attr_by_local(&e, b"name").filter(|n| !n.is_empty());
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

// ── Shape tree ───────────────────────────────────────────────────────────────

/// Top-level shapes of one slide, in document order.
///
/// Groups, connectors and ink are skipped whole; graphic frames survive
/// only when they hold a table.
fn parse_slide_shapes(xml: &str) -> Result<Vec<Shape>, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => shapes.push(parse_sp(&mut reader)?),
                b"pic" => shapes.push(parse_pic(&mut reader)?),
                b"graphicFrame" => {
                    if let Some(shape) = parse_graphic_frame(&mut reader)? {
                        shapes.push(shape);
                    }
                }
                b"grpSp" | b"cxnSp" | b"contentPart" => skip_subtree(&mut reader)?,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}

/// A `p:sp`: placeholder role, position, and text body.
fn parse_sp(reader: &mut Reader<&[u8]>) -> Result<Shape, XmlError> {
    let mut depth = 0usize;
    let mut role = None;
    let mut top = 0i64;
    let mut left = 0i64;
    let mut have_off = false;
    let mut body = TextBody::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txBody" => parse_text_body(reader, &mut body)?,
                b"ph" => {
                    role = Some(role_from_ph(&e));
                    skip_subtree(reader)?;
                }
                b"off" => {
                    if !have_off {
                        if let Some((x, y)) = off_attrs(&e) {
                            left = x;
                            top = y;
                            have_off = true;
                        }
                    }
                    skip_subtree(reader)?;
                }
                _ => depth += 1,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => role = Some(role_from_ph(&e)),
                b"off" if !have_off => {
                    if let Some((x, y)) = off_attrs(&e) {
                        left = x;
                        top = y;
                        have_off = true;
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Shape {
        top,
        left,
        placeholder: role,
        kind: ShapeKind::Text(body),
    })
}

/// A `p:pic`: position and optional placeholder role, no text.
fn parse_pic(reader: &mut Reader<&[u8]>) -> Result<Shape, XmlError> {
    let mut depth = 0usize;
    let mut role = None;
    let mut top = 0i64;
    let mut left = 0i64;
    let mut have_off = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ph" => {
                    role = Some(role_from_ph(&e));
                    skip_subtree(reader)?;
                }
                b"off" => {
                    if !have_off {
                        if let Some((x, y)) = off_attrs(&e) {
                            left = x;
                            top = y;
                            have_off = true;
                        }
                    }
                    skip_subtree(reader)?;
                }
                _ => depth += 1,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => role = Some(role_from_ph(&e)),
                b"off" if !have_off => {
                    if let Some((x, y)) = off_attrs(&e) {
                        left = x;
                        top = y;
                        have_off = true;
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Shape {
        top,
        left,
        placeholder: role,
        kind: ShapeKind::Picture,
    })
}

/// A `p:graphicFrame`. Only table frames produce a shape; charts,
/// diagrams and embedded objects are dropped.
fn parse_graphic_frame(reader: &mut Reader<&[u8]>) -> Result<Option<Shape>, XmlError> {
    let mut depth = 0usize;
    let mut role = None;
    let mut top = 0i64;
    let mut left = 0i64;
    let mut have_off = false;
    let mut table: Option<Table> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table = Some(parse_table(reader)?),
                b"ph" => {
                    role = Some(role_from_ph(&e));
                    skip_subtree(reader)?;
                }
                b"off" => {
                    if !have_off {
                        if let Some((x, y)) = off_attrs(&e) {
                            left = x;
                            top = y;
                            have_off = true;
                        }
                    }
                    skip_subtree(reader)?;
                }
                _ => depth += 1,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => role = Some(role_from_ph(&e)),
                b"off" if !have_off => {
                    if let Some((x, y)) = off_attrs(&e) {
                        left = x;
                        top = y;
                        have_off = true;
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(table.map(|t| Shape {
        top,
        left,
        placeholder: role,
        kind: ShapeKind::Table(t),
    }))
}

fn parse_table(reader: &mut Reader<&[u8]>) -> Result<Table, XmlError> {
    let mut depth = 0usize;
    let mut rows = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => rows.push(parse_table_row(reader)?),
                _ => depth += 1,
            },
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Table { rows })
}

fn parse_table_row(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, XmlError> {
    let mut depth = 0usize;
    let mut cells = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tc" => cells.push(parse_table_cell(reader)?),
                _ => depth += 1,
            },
            // Merged-away cells can be written as empty elements; keep them
            // so row widths stay consistent.
            Event::Empty(e) if e.local_name().as_ref() == b"tc" => cells.push(String::new()),
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(cells)
}

fn parse_table_cell(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut depth = 0usize;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut cell_math = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(parse_paragraph(reader, &mut cell_math)?.text),
                _ => depth += 1,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => paragraphs.push(String::new()),
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs.join("\n"))
}

/// The paragraphs and math islands of a `p:txBody`.
fn parse_text_body(reader: &mut Reader<&[u8]>, body: &mut TextBody) -> Result<(), XmlError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    let para = parse_paragraph(reader, &mut body.math)?;
                    body.paragraphs.push(para);
                }
                _ => depth += 1,
            },
            // Empty paragraphs matter: they separate code-block candidates.
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                body.paragraphs.push(Paragraph {
                    text: String::new(),
                    level: 0,
                });
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// One `a:p`: run text concatenated (breaks as `\n`), indent level, and any
/// `m:oMath` islands captured raw.
///
/// `mc:Fallback` branches are skipped: they duplicate content the
/// `mc:Choice` branch (math, ink) already provides in richer form.
fn parse_paragraph(
    reader: &mut Reader<&[u8]>,
    math: &mut Vec<String>,
) -> Result<Paragraph, XmlError> {
    let mut depth = 0usize;
    let mut text = String::new();
    let mut level = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => {
                    level = lvl_attr(&e);
                    skip_subtree(reader)?;
                }
                b"t" => text.push_str(&read_text(reader)?),
                b"br" => {
                    text.push('\n');
                    depth += 1;
                }
                b"oMath" => {
                    if let Some(fragment) = capture_subtree(reader, &e)? {
                        math.push(fragment);
                    }
                }
                b"Fallback" => skip_subtree(reader)?,
                _ => depth += 1,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"pPr" => level = lvl_attr(&e),
                b"br" => text.push('\n'),
                _ => {}
            },
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Paragraph { text, level })
}

/// Character content of an `a:t` element.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut out = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => out.push_str(&t.unescape()?),
            Event::End(e) if e.local_name().as_ref() == b"t" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Re-serialise an element subtree (start tag already consumed) so it can
/// be parsed on its own later. Used for `m:oMath` islands.
fn capture_subtree(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<Option<String>, XmlError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Start(start.clone()))?;
    let mut depth = 0usize;
    loop {
        let ev = reader.read_event()?;
        let done = matches!(&ev, Event::End(_)) && depth == 0;
        match &ev {
            Event::Start(_) => depth += 1,
            Event::End(_) if !done => depth -= 1,
            Event::Eof => return Ok(None),
            _ => {}
        }
        writer.write_event(ev)?;
        if done {
            break;
        }
    }
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes).ok())
}

fn skip_subtree(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

// ── Attribute helpers ────────────────────────────────────────────────────────

fn attr_by_local(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn attr_by_qname(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn role_from_ph(e: &BytesStart<'_>) -> PlaceholderRole {
    PlaceholderRole::from_ph_type(attr_by_local(e, b"type").as_deref())
}

fn off_attrs(e: &BytesStart<'_>) -> Option<(i64, i64)> {
    let x = attr_by_local(e, b"x")?.parse().ok()?;
    let y = attr_by_local(e, b"y")?.parse().ok()?;
    Some((x, y))
}

fn lvl_attr(e: &BytesStart<'_>) -> usize {
    attr_by_local(e, b"lvl")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
