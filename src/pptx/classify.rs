//! Slide and shape classification heuristics.
//!
//! Layout names are the only reliable signal PowerPoint gives for what a
//! slide *is*, so the slide type comes from substring checks against the
//! lowercased layout name. Title and subtitle come from placeholder roles,
//! and the remaining shapes are ordered by position so reading order is
//! top-to-bottom, left-to-right regardless of insertion order.

use crate::pptx::model::{PlaceholderRole, Shape, ShapeKind, Slide};

pub(crate) const TITLE_SLIDE: &str = "Title Slide";
pub(crate) const CONTENT_SLIDE: &str = "Content Slide";
pub(crate) const SECTION_DIVIDER: &str = "Section Divider";

/// Classify a slide from its layout name.
///
/// "Title and Content"-style layouts contain "title" but are content
/// slides, hence the content/body/object guard. The Korean token covers
/// decks authored in localised PowerPoint, where the built-in section
/// layout is named "구역 머리글".
pub(crate) fn slide_type(layout_name: Option<&str>) -> &'static str {
    let name = match layout_name {
        Some(n) if !n.trim().is_empty() => n.to_lowercase(),
        _ => return CONTENT_SLIDE,
    };

    let has = |token: &str| name.contains(token);

    if has("title") && !(has("content") || has("body") || has("object")) {
        if has("section") || has("header") || has("divider") || has("구역") {
            SECTION_DIVIDER
        } else {
            TITLE_SLIDE
        }
    } else if has("section") || has("header") || has("구역") {
        SECTION_DIVIDER
    } else {
        CONTENT_SLIDE
    }
}

/// Extra layout note, currently just centre alignment.
pub(crate) fn layout_hint(layout_name: Option<&str>) -> Option<&'static str> {
    layout_name
        .filter(|n| n.to_lowercase().contains("center"))
        .map(|_| "Center-aligned")
}

/// Title and subtitle text from placeholder roles, in document order.
/// When a slide carries several candidates the last non-empty one wins,
/// which matches how PowerPoint itself resolves duplicated placeholders.
pub(crate) fn title_and_subtitle(slide: &Slide) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut subtitle = None;
    for shape in &slide.shapes {
        let ShapeKind::Text(body) = &shape.kind else {
            continue;
        };
        let text = body.full_text().trim().to_string();
        if text.is_empty() {
            continue;
        }
        match shape.placeholder {
            Some(PlaceholderRole::Title) => title = Some(text),
            Some(PlaceholderRole::Subtitle) => subtitle = Some(text),
            _ => {}
        }
    }
    (title, subtitle)
}

/// Whether a shape belongs in the `### Content` section.
///
/// Tables and pictures always do. Text shapes do unless they sit in a
/// title-family placeholder, which the header lines already cover.
pub(crate) fn is_content_shape(shape: &Shape) -> bool {
    match &shape.kind {
        ShapeKind::Table(_) | ShapeKind::Picture => true,
        ShapeKind::Text(_) => matches!(
            shape.placeholder,
            None | Some(PlaceholderRole::Body)
        ),
    }
}

/// Content shapes of a slide in reading order: top-to-bottom, then
/// left-to-right, with document order breaking exact ties.
pub(crate) fn content_shapes(slide: &Slide) -> Vec<&Shape> {
    let mut shapes: Vec<&Shape> = slide.shapes.iter().filter(|s| is_content_shape(s)).collect();
    shapes.sort_by_key(|s| (s.top, s.left));
    shapes
}
