//! Deterministic cleanup of generated Markdown.
//!
//! [`clean_vlm_markdown`] runs on every vision/polish model response. Models
//! disobey formatting instructions in small, recurring ways: an outer
//! ` ```markdown ` fence, CRLF endings, a `![figure](image.png)` reference to
//! a file that does not exist, a stray separator row in the middle of a
//! table. Fixing these with string rules after the call keeps the prompts
//! about content, and keeps the fixes testable without a model.
//!
//! [`finalize_document`] is the cheaper sibling for assembled heuristic
//! output: image-only lines out, blank runs collapsed, exactly one trailing
//! newline.
//!
//! Rule order matters. Fences come off before anything line-oriented runs,
//! blank runs collapse before heading spacing, and the trailing-newline fix
//! is always last.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

type Rule = fn(&str) -> String;

/// Cleanup passes for model responses, applied first to last.
const VLM_RULES: [(&str, Rule); 8] = [
    ("strip-fences", strip_response_fences),
    ("newlines", unify_newlines),
    ("line-ends", trim_line_ends),
    ("blank-runs", collapse_blank_runs),
    ("heading-space", space_headings),
    ("tables", repair_tables),
    ("images", drop_fake_images),
    ("zero-width", strip_zero_width),
];

/// Clean up a raw model response.
///
/// Every pass is a pure `&str -> String` function from [`VLM_RULES`];
/// the result always ends with exactly one newline.
pub fn clean_vlm_markdown(input: &str) -> String {
    let mut text = input.to_string();
    for (name, rule) in VLM_RULES {
        let out = rule(&text);
        if out != text {
            trace!(rule = name, "cleanup rule rewrote the response");
        }
        text = out;
    }
    ensure_final_newline(&text)
}

/// Finalise an assembled heuristic document.
///
/// Image-only lines are removed wholesale, blank runs collapse to one blank
/// line, and the result carries a single trailing newline. Empty input stays
/// empty.
pub fn finalize_document(input: &str) -> String {
    let s = drop_image_lines(input);
    let s = collapse_blank_runs(&s);
    let s = s.trim();
    if s.is_empty() {
        String::new()
    } else {
        format!("{s}\n")
    }
}

// ── Fences ───────────────────────────────────────────────────────────────────

// Only a fence wrapping the ENTIRE response is stripped; fenced code blocks
// inside the document must survive, so the closing fence is matched from the
// end of the text.
fn strip_response_fences(input: &str) -> String {
    let trimmed = input.trim();
    let opener = if trimmed.starts_with("```markdown\n") {
        "```markdown\n"
    } else if trimmed.starts_with("```\n") {
        "```\n"
    } else {
        return input.to_string();
    };
    match trimmed[opener.len()..]
        .strip_suffix("```")
        .and_then(|body| body.strip_suffix('\n'))
    {
        Some(body) => body.to_string(),
        None => input.to_string(),
    }
}

// ── Whitespace ───────────────────────────────────────────────────────────────

fn unify_newlines(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_line_ends(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.pop();
    out
}

static RE_EXTRA_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

pub(crate) fn collapse_blank_runs(input: &str) -> String {
    RE_EXTRA_BLANKS.replace_all(input, "\n\n").to_string()
}

fn ensure_final_newline(input: &str) -> String {
    let body = input.trim_end();
    if body.is_empty() {
        String::from("\n")
    } else {
        format!("{body}\n")
    }
}

// ── Headings ─────────────────────────────────────────────────────────────────

// A heading glued to the previous paragraph renders as plain text in strict
// parsers. Runs after blank-run collapsing, so at most one blank line
// precedes any heading.
fn space_headings(input: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in input.lines() {
        if line.starts_with('#') && out.last().is_some_and(|prev| !prev.is_empty()) {
            out.push("");
        }
        out.push(line);
    }
    out.join("\n")
}

// ── Tables ───────────────────────────────────────────────────────────────────

// One pass over each table block: a header row with no separator beneath it
// gets one synthesised, and separator rows anywhere past position 2 are
// dropped. GFM accepts a separator in position 2 only.
fn repair_tables(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 4);
    let mut row = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !is_table_row(line) {
            row = 0;
            out.push((*line).to_string());
            continue;
        }
        row += 1;

        if is_separator_row(line) {
            if row == 2 {
                out.push((*line).to_string());
            }
            continue;
        }

        out.push((*line).to_string());
        if row == 1 {
            let next = lines.get(i + 1).copied().unwrap_or("");
            if is_table_row(next) && !is_separator_row(next) {
                let cols = line.matches('|').count().saturating_sub(1).max(1);
                out.push(format!("|{}", " --- |".repeat(cols)));
                row += 1;
            }
        }
    }

    out.join("\n")
}

fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|') && t.ends_with('|') && t.len() > 2
}

fn is_separator_row(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|') && t.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

// ── Images ───────────────────────────────────────────────────────────────────

// Models describe figures they cannot transcribe by inventing a link target:
// a bare filename, `image-url`, or a stock placeholder host. Such links are
// replaced by their alt text in italics; links with a credible absolute URL
// pass through.
static RE_INLINE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap());

const PLACEHOLDER_HOSTS: [&str; 7] = [
    "example.com",
    "placeholder.com",
    "via.placeholder.com",
    "dummyimage.com",
    "lorempixel.com",
    "picsum.photos",
    "placehold.it",
];

fn looks_fabricated(url: &str) -> bool {
    let u = url.trim();
    u.is_empty()
        || !(u.starts_with("http://") || u.starts_with("https://"))
        || PLACEHOLDER_HOSTS.iter().any(|host| u.contains(host))
}

fn drop_fake_images(input: &str) -> String {
    RE_INLINE_IMAGE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let alt = caps[1].trim();
            if !looks_fabricated(&caps[2]) {
                caps[0].to_string()
            } else if alt.is_empty() {
                String::new()
            } else {
                format!("*{alt}*")
            }
        })
        .to_string()
}

// Heuristic converters drop pictures entirely, so any line that is nothing
// but an image reference is noise regardless of its URL. The emptied line is
// left for the blank-run collapse.
static RE_IMAGE_ONLY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^!\[.*\]\(.*\)[ \t]*$").unwrap());

fn drop_image_lines(input: &str) -> String {
    RE_IMAGE_ONLY_LINE.replace_all(input, "").to_string()
}

// ── Unicode ──────────────────────────────────────────────────────────────────

const ZERO_WIDTH: [char; 6] = [
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

fn strip_zero_width(input: &str) -> String {
    input.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
