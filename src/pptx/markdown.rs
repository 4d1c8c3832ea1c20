//! Structured markdown rendering for the `shapes` engine.
//!
//! Every slide becomes a fixed-template block:
//!
//! ```text
//! ## Slide 3
//! **Type**: Content Slide
//! **Title**: Quarterly results
//!
//! ### Content
//!
//! - first point
//! ```
//!
//! Blocks are joined with `---` rules and the whole document goes through
//! [`finalize_document`] once at the end.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::omml::omml_to_latex;
use crate::postprocess::finalize_document;
use crate::pptx::classify;
use crate::pptx::model::{ShapeKind, Slide, SlideDeck, Table, TextBody};

/// Render a whole deck to markdown.
pub(crate) fn render_deck(deck: &SlideDeck) -> String {
    let blocks: Vec<String> = deck.slides.iter().map(render_slide).collect();
    finalize_document(&blocks.join("\n\n---\n\n"))
}

fn render_slide(slide: &Slide) -> String {
    let layout = slide.layout_name.as_deref();
    let (title, subtitle) = classify::title_and_subtitle(slide);

    let mut lines = vec![
        format!("## Slide {}", slide.number),
        format!("**Type**: {}", classify::slide_type(layout)),
    ];
    if let Some(hint) = classify::layout_hint(layout) {
        lines.push(format!("**Layout**: {hint}"));
    }
    if let Some(t) = &title {
        lines.push(format!("**Title**: {}", t.replace('\n', " ")));
    }
    if let Some(s) = &subtitle {
        lines.push(format!("**Subtitle**: {}", s.replace('\n', " ")));
    }
    lines.push(String::new());
    lines.push("### Content".to_string());
    lines.push(String::new());

    let content = render_content(slide, title.as_deref(), subtitle.as_deref());
    if !content.is_empty() {
        lines.push(content);
    }
    lines.join("\n")
}

/// Body shapes in reading order. Text equal to the already-emitted title
/// or subtitle is dropped rather than shown twice.
fn render_content(slide: &Slide, title: Option<&str>, subtitle: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for shape in classify::content_shapes(slide) {
        match &shape.kind {
            ShapeKind::Table(table) => {
                let md = table_to_markdown(table);
                if !md.is_empty() {
                    parts.push(md);
                }
            }
            ShapeKind::Picture => {}
            ShapeKind::Text(body) => {
                let trimmed = body.full_text().trim().to_string();
                if trimmed.is_empty() && body.math.is_empty() {
                    continue;
                }
                if title == Some(trimmed.as_str()) || subtitle == Some(trimmed.as_str()) {
                    continue;
                }
                let block = text_block(body);
                if !block.is_empty() {
                    parts.push(block);
                }
            }
        }
    }
    parts.join("\n\n")
}

/// Paragraph markdown for one text body, with its math islands appended
/// as display-math blocks.
fn text_block(body: &TextBody) -> String {
    let mut parts: Vec<String> = Vec::new();
    let paragraphs = paragraphs_markdown(body);
    if !paragraphs.is_empty() {
        parts.push(paragraphs);
    }
    for fragment in &body.math {
        if let Some(latex) = omml_to_latex(fragment) {
            parts.push(format!("$${latex}$$"));
        }
    }
    parts.join("\n\n")
}

/// Convert paragraphs to markdown: indent levels become nested bullets,
/// and consecutive code-looking lines collapse into one fenced block.
fn paragraphs_markdown(body: &TextBody) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut code: Vec<String> = Vec::new();

    let flush = |code: &mut Vec<String>, parts: &mut Vec<String>| {
        if !code.is_empty() {
            parts.push(format!("```\n{}\n```", code.join("\n")));
            code.clear();
        }
    };

    for para in &body.paragraphs {
        let trimmed = para.text.trim();
        if trimmed.is_empty() {
            flush(&mut code, &mut parts);
            continue;
        }
        if para.level == 0 && looks_like_code(&para.text, trimmed) {
            // Keep leading indentation inside the fence.
            code.push(para.text.trim_end().to_string());
            continue;
        }
        flush(&mut code, &mut parts);
        if para.level > 0 {
            parts.push(format!("{}- {}", "   ".repeat(para.level), trimmed));
        } else {
            parts.push(trimmed.to_string());
        }
    }
    flush(&mut code, &mut parts);
    parts.join("\n\n")
}

static RE_CODE_STMT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:from\s+\S+\s+import|import\s+\S+|def\s+\w+|class\s+\w+)").unwrap()
});

fn looks_like_code(raw: &str, trimmed: &str) -> bool {
    raw.starts_with("  ")
        || ["from ", "import ", "def ", "class "]
            .iter()
            .any(|kw| trimmed.starts_with(kw))
        || RE_CODE_STMT.is_match(trimmed)
}

/// Render a table as a GitHub-style pipe table. Ragged rows are padded to
/// the widest row so the table stays valid markdown.
pub(crate) fn table_to_markdown(table: &Table) -> String {
    let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let clean = |cell: &str| cell.replace('|', "\\|").replace('\n', " ").trim().to_string();
    let row_line = |row: &[String]| {
        let mut cells: Vec<String> = row.iter().map(|c| clean(c)).collect();
        cells.resize(width, String::new());
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    let mut rows = table.rows.iter();
    if let Some(header) = rows.next() {
        lines.push(row_line(header));
        lines.push(format!("| {} |", vec!["---"; width].join(" | ")));
    }
    for row in rows {
        lines.push(row_line(row));
    }
    lines.join("\n")
}
