//! Conversion options for the PDF and PPTX pipelines.
//!
//! Each format gets one small options struct with public fields and
//! documented defaults; [`LlmOptions`] is shared by every LLM-backed path.
//! Page subsets are expressed as a [`PageList`], parsed from the CLI
//! `"0,2-4"` grammar.

use crate::engine::{PdfEngine, PptxEngine};
use crate::error::Doc2MdError;
use serde::{Deserialize, Serialize};

/// A parsed page/slide selection: 0-based indices, sorted, deduplicated.
///
/// The grammar accepts comma-separated integers and inclusive ranges:
/// `"0,1,2"`, `"0-2"`, `"0,2-4"`. Whitespace is ignored. An empty string
/// parses to an empty list, which converters treat as "all pages".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageList(Vec<usize>);

impl PageList {
    /// Parse the `"0,2-4"` grammar into a sorted, deduplicated index list.
    pub fn parse(input: &str) -> Result<Self, Doc2MdError> {
        let bad = |detail: String| Doc2MdError::InvalidPageList {
            input: input.to_string(),
            detail,
        };

        let mut out = Vec::new();
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        for part in compact.split(',') {
            if part.is_empty() {
                continue;
            }
            match part.split_once('-') {
                Some((a, b)) => {
                    let start: usize = a
                        .parse()
                        .map_err(|_| bad(format!("'{a}' is not a page number")))?;
                    let end: usize = b
                        .parse()
                        .map_err(|_| bad(format!("'{b}' is not a page number")))?;
                    // An inverted range is empty, not an error.
                    out.extend(start..=end);
                }
                None => {
                    out.push(
                        part.parse()
                            .map_err(|_| bad(format!("'{part}' is not a page number")))?,
                    );
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(Self(out))
    }

    /// The selected 0-based indices, sorted ascending.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Error if any selected index falls outside `0..total`.
    pub fn check_in_range(&self, total: usize) -> Result<(), Doc2MdError> {
        match self.0.iter().find(|&&p| p >= total) {
            Some(&page) => Err(Doc2MdError::PageOutOfRange { page, total }),
            None => Ok(()),
        }
    }
}

/// Options shared by every LLM-backed path (vision engines, polish).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmOptions {
    /// Model identifier, e.g. "gpt-4o", "claude-sonnet-4-20250514".
    /// If None, the provider's default vision/text model is used.
    pub model: Option<String>,

    /// Provider name (e.g. "openai", "anthropic", "ollama"). If None, the
    /// provider is resolved from `EDGEQUAKE_LLM_PROVIDER` or autodetected
    /// from well-known API-key environment variables.
    pub provider: Option<String>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to what is on the page,
    /// which is what transcription and polish both want.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 4096.
    pub max_tokens: usize,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            model: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
        }
    }
}

/// Options for [`crate::convert`] (PDF → Markdown).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfOptions {
    /// Engine to dispatch to. Default: [`PdfEngine::Pdfium`].
    pub engine: PdfEngine,

    /// Page subset, 0-based. None or empty means all pages. The `vision`
    /// engine ignores this and always converts the whole document.
    pub pages: Option<PageList>,

    /// Maximum rendered page dimension in pixels for the `vision` engine.
    /// Caps memory use for oversized pages. Default: 2000, floor 100.
    pub max_rendered_pixels: u32,

    /// LLM settings for the `vision` engine.
    pub llm: LlmOptions,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            engine: PdfEngine::default(),
            pages: None,
            max_rendered_pixels: DEFAULT_MAX_RENDERED_PIXELS,
            llm: LlmOptions::default(),
        }
    }
}

impl PdfOptions {
    pub fn with_engine(engine: PdfEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }
}

/// Options for [`crate::convert_pptx`] (PPTX → Markdown).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PptxOptions {
    /// Engine to dispatch to. Default: [`PptxEngine::Shapes`].
    pub engine: PptxEngine,

    /// Slide subset, 0-based. Accepted for interface compatibility but
    /// currently ignored: the full deck is always converted.
    pub slides: Option<PageList>,

    /// Convert via the multimodal path: slides rendered to images and
    /// transcribed by a vision model. Overrides `engine`.
    pub multimodal: bool,

    /// Maximum rendered slide dimension in pixels for the multimodal path.
    /// Default: 2000, floor 100.
    pub max_rendered_pixels: u32,

    /// LLM settings for the multimodal path.
    pub llm: LlmOptions,
}

impl Default for PptxOptions {
    fn default() -> Self {
        Self {
            engine: PptxEngine::default(),
            slides: None,
            multimodal: false,
            max_rendered_pixels: DEFAULT_MAX_RENDERED_PIXELS,
            llm: LlmOptions::default(),
        }
    }
}

impl PptxOptions {
    pub fn with_engine(engine: PptxEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }
}

pub(crate) const DEFAULT_MAX_RENDERED_PIXELS: u32 = 2000;

pub(crate) fn effective_max_pixels(requested: u32) -> u32 {
    requested.max(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_indices() {
        let pages = PageList::parse("0,1,2").unwrap();
        assert_eq!(pages.indices(), &[0, 1, 2]);
    }

    #[test]
    fn parses_inclusive_range() {
        let pages = PageList::parse("0-2").unwrap();
        assert_eq!(pages.indices(), &[0, 1, 2]);
    }

    #[test]
    fn parses_mixed_indices_and_ranges() {
        let pages = PageList::parse("0,2-3").unwrap();
        assert_eq!(pages.indices(), &[0, 2, 3]);
    }

    #[test]
    fn duplicates_collapse_and_output_is_sorted() {
        let pages = PageList::parse("3,1,1,2-3").unwrap();
        assert_eq!(pages.indices(), &[1, 2, 3]);
    }

    #[test]
    fn whitespace_is_ignored() {
        let pages = PageList::parse(" 0 , 2 - 3 ").unwrap();
        assert_eq!(pages.indices(), &[0, 2, 3]);
    }

    #[test]
    fn empty_string_parses_to_empty_list() {
        let pages = PageList::parse("").unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn trailing_comma_is_tolerated() {
        let pages = PageList::parse("0,1,").unwrap();
        assert_eq!(pages.indices(), &[0, 1]);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let pages = PageList::parse("3-1").unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = PageList::parse("0,two").unwrap_err();
        assert!(err.to_string().contains("Invalid page list"));
    }

    #[test]
    fn range_check_names_first_offender() {
        let pages = PageList::parse("0,5").unwrap();
        let err = pages.check_in_range(3).unwrap_err();
        assert!(err.to_string().contains("Page 5"));
        assert!(pages.check_in_range(6).is_ok());
    }

    #[test]
    fn llm_defaults() {
        let llm = LlmOptions::default();
        assert_eq!(llm.temperature, 0.1);
        assert_eq!(llm.max_tokens, 4096);
        assert!(llm.model.is_none());
    }

    #[test]
    fn effective_pixels_floor() {
        assert_eq!(effective_max_pixels(50), 100);
        assert_eq!(effective_max_pixels(1600), 1600);
    }

    #[test]
    fn option_defaults() {
        let pdf = PdfOptions::default();
        assert_eq!(pdf.max_rendered_pixels, DEFAULT_MAX_RENDERED_PIXELS);
        let pptx = PptxOptions::default();
        assert!(!pptx.multimodal);
        assert!(pptx.slides.is_none());
    }
}
