//! Instruction prompts for the LLM-backed paths.
//!
//! Every prompt lives here rather than beside its call site: behaviour
//! changes (table handling, the slide template) are a one-place edit, and
//! unit tests can pin template invariants without touching a model.

/// System prompt for converting a PDF page image to Markdown.
pub const PDF_PAGE_PROMPT: &str = r#"You convert one PDF page image into clean, well-structured Markdown.

Rules:

1. TEXT
   - Transcribe every piece of text on the page; never summarise
   - Keep the order a human reader would follow

2. STRUCTURE
   - # only for the page's main title, ## and ### for sections below it
   - Bullet lists use -, numbered lists use 1. 2. 3.
   - **Bold** and *italic* follow the visual emphasis on the page

3. TABLES
   - Reproduce tables as GFM pipe tables

4. CODE AND MATH
   - Source code goes in fenced blocks with a language tag
   - Mathematics becomes LaTeX: $...$ inline, $$...$$ for display

5. IGNORE
   - Page numbers, running headers and footers, decorative borders

6. OUTPUT
   - Return the Markdown body only
   - No surrounding ```markdown fence, no commentary, no preamble
   - Start directly with the page content"#;

/// System prompt for converting a slide image into the slide-block template.
///
/// The user message carries the slide label (e.g. "Slide 3"); the model
/// must echo it in the heading so assembled decks keep their numbering.
pub const SLIDE_PROMPT: &str = r#"You are an expert presentation converter. Your task is to convert a slide image to Markdown using a fixed template.

The user message names the slide, e.g. "Slide 3". Produce exactly this structure:

## Slide {number from the user message}
**Type**: one of: Title Slide | Content Slide | Section Divider
**Title**: the slide title, omit the line if there is none
**Subtitle**: the slide subtitle, omit the line if there is none

### Content

The slide body as Markdown, following these rules:
- Bullet points become - list items, nested by indentation
- Tables become GFM pipe tables
- Source code becomes a fenced code block with a language identifier
- Mathematical notation becomes LaTeX ($inline$ or $$display$$)
- Describe charts and diagrams in one short sentence
- If the slide has no body content, leave the section empty

Output ONLY the filled template. Do NOT wrap it in ```markdown fences. Do NOT add commentary."#;

/// System prompt for the polish pass over assembled Markdown.
pub const POLISH_PROMPT: &str = r####"You are a Markdown editor. You receive a Markdown document produced by an automatic converter and return an improved version of the same document.

Rules:
- Keep the document structure intact: every "## Slide N" heading, "**Type**:" line, "### Content" heading and "---" separator must survive unchanged
- Fix broken formatting: stray emphasis markers, malformed tables, inconsistent list markers
- Add a language identifier to fenced code blocks when it is obvious from the code
- Do not invent, summarise, or drop content
- Output ONLY the corrected Markdown, without ```markdown fences or commentary"####;
