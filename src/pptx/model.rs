//! In-memory model of a presentation, as read from the OPC package.
//!
//! Only what the Markdown renderers need survives parsing: shape positions
//! (for visual ordering), placeholder roles (for title/subtitle extraction
//! and content filtering), paragraph text with indent levels, tables, and
//! captured math fragments. Styling, themes, masters and media are not
//! represented.

/// A parsed presentation: slides in presentation order.
#[derive(Debug, Default)]
pub(crate) struct SlideDeck {
    pub slides: Vec<Slide>,
}

/// One slide with its layout name and top-level shapes in document order.
#[derive(Debug)]
pub(crate) struct Slide {
    /// 1-based position in the presentation's slide order.
    pub number: usize,
    /// Name of the slide layout (`p:cSld/@name` in the layout part).
    pub layout_name: Option<String>,
    pub shapes: Vec<Shape>,
}

/// A top-level shape. Grouped shapes, connectors and non-table graphic
/// frames are dropped at parse time.
#[derive(Debug)]
pub(crate) struct Shape {
    /// Offset from the top of the slide, in EMU. 0 when no transform is set.
    pub top: i64,
    /// Offset from the left edge, in EMU. 0 when no transform is set.
    pub left: i64,
    /// Placeholder role, when the shape is a layout placeholder.
    pub placeholder: Option<PlaceholderRole>,
    pub kind: ShapeKind,
}

#[derive(Debug)]
pub(crate) enum ShapeKind {
    Text(TextBody),
    Table(Table),
    Picture,
}

/// Placeholder roles that matter to classification, from `p:ph/@type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaceholderRole {
    /// `title` or `ctrTitle`.
    Title,
    /// `subTitle`.
    Subtitle,
    /// `body`, or the attribute default when `@type` is absent.
    Body,
    /// Any other role: object, picture, table, date, footer, slide number.
    Other,
}

impl PlaceholderRole {
    /// Map a `p:ph/@type` value. `None` means the attribute was absent,
    /// which the schema defaults to `body`.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type {
            Some("title") | Some("ctrTitle") => Self::Title,
            Some("subTitle") => Self::Subtitle,
            Some("body") | None => Self::Body,
            Some(_) => Self::Other,
        }
    }
}

/// The text of a shape: paragraphs plus any embedded math fragments.
#[derive(Debug, Default)]
pub(crate) struct TextBody {
    pub paragraphs: Vec<Paragraph>,
    /// Raw `m:oMath` XML fragments found in the body, in document order.
    pub math: Vec<String>,
}

impl TextBody {
    /// Full text of the body: paragraph texts joined with newlines.
    ///
    /// This is the string used for title/subtitle capture and for the
    /// "body text repeats the title" comparison.
    pub fn full_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One paragraph: concatenated run text with explicit breaks as `\n`.
#[derive(Debug)]
pub(crate) struct Paragraph {
    pub text: String,
    /// Outline indent level from `a:pPr/@lvl`, 0 for top level.
    pub level: usize,
}

/// A table: rows of raw cell text (paragraphs joined with `\n`).
#[derive(Debug, Default)]
pub(crate) struct Table {
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ph_type_mapping() {
        assert_eq!(
            PlaceholderRole::from_ph_type(Some("title")),
            PlaceholderRole::Title
        );
        assert_eq!(
            PlaceholderRole::from_ph_type(Some("ctrTitle")),
            PlaceholderRole::Title
        );
        assert_eq!(
            PlaceholderRole::from_ph_type(Some("subTitle")),
            PlaceholderRole::Subtitle
        );
        assert_eq!(
            PlaceholderRole::from_ph_type(Some("body")),
            PlaceholderRole::Body
        );
        // Absent @type defaults to body per the schema
        assert_eq!(PlaceholderRole::from_ph_type(None), PlaceholderRole::Body);
        assert_eq!(
            PlaceholderRole::from_ph_type(Some("sldNum")),
            PlaceholderRole::Other
        );
    }

    #[test]
    fn full_text_joins_paragraphs() {
        let body = TextBody {
            paragraphs: vec![
                Paragraph {
                    text: "First".into(),
                    level: 0,
                },
                Paragraph {
                    text: "Second".into(),
                    level: 1,
                },
            ],
            math: Vec::new(),
        };
        assert_eq!(body.full_text(), "First\nSecond");
    }
}
