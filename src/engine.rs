//! Engine registry: the named backends behind `convert` and `convert_pptx`.
//!
//! Engines are closed enums rather than trait objects: there are two per
//! format and they share almost nothing. What the registry provides is the
//! lenient name parsing the CLI needs (case-insensitive, whitespace
//! tolerated, unknown names error with the full choice list) and an
//! availability check, so an engine whose capability is missing (no LLM
//! provider configured) is rejected up front with an actionable hint
//! instead of failing halfway through a conversion.

use crate::config::LlmOptions;
use crate::error::Doc2MdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variables that imply a usable LLM provider.
///
/// `ProviderFactory::from_env` autodetects from these; the availability
/// check mirrors that list so the registry can fail fast with a hint.
const PROVIDER_ENV_VARS: &[&str] = &[
    "EDGEQUAKE_LLM_PROVIDER",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "GEMINI_API_KEY",
];

fn provider_configured(llm: &LlmOptions) -> bool {
    if llm.provider.is_some() {
        return true;
    }
    PROVIDER_ENV_VARS
        .iter()
        .any(|var| std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false))
}

/// Check that an LLM-backed path can run, erroring with a setup hint if not.
pub(crate) fn require_provider_configured(
    engine: &'static str,
    llm: &LlmOptions,
) -> Result<(), Doc2MdError> {
    if provider_configured(llm) {
        Ok(())
    } else {
        Err(Doc2MdError::EngineUnavailable {
            engine,
            hint: "No LLM provider is configured. Set OPENAI_API_KEY, ANTHROPIC_API_KEY \
                   or GEMINI_API_KEY, or select a provider with --provider / \
                   EDGEQUAKE_LLM_PROVIDER (e.g. 'ollama' for a local model)."
                .to_string(),
        })
    }
}

/// PDF conversion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PdfEngine {
    /// Fast structural text extraction via pdfium. Honors page subsets.
    #[default]
    Pdfium,
    /// High-fidelity transcription via a vision model. Ignores page
    /// subsets: the whole document is always converted (known limitation).
    Vision,
}

impl PdfEngine {
    pub const NAMES: &'static [&'static str] = &["pdfium", "vision"];

    /// Parse an engine name, case-insensitively, ignoring surrounding
    /// whitespace. Idempotent over [`PdfEngine::as_str`].
    pub fn parse(name: &str) -> Result<Self, Doc2MdError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdfium" => Ok(Self::Pdfium),
            "vision" => Ok(Self::Vision),
            _ => Err(unknown_engine(name, Self::NAMES)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdfium => "pdfium",
            Self::Vision => "vision",
        }
    }

    /// Error unless every capability the engine needs is present.
    pub fn check_available(&self, llm: &LlmOptions) -> Result<(), Doc2MdError> {
        match self {
            Self::Pdfium => Ok(()),
            Self::Vision => require_provider_configured("vision", llm),
        }
    }
}

impl fmt::Display for PdfEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfEngine {
    type Err = Doc2MdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// PPTX conversion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PptxEngine {
    /// Shape-tree traversal with slide/shape classification heuristics.
    #[default]
    Shapes,
    /// Flat partitioning: per-slide concatenated text, no heuristics.
    Flat,
}

impl PptxEngine {
    pub const NAMES: &'static [&'static str] = &["shapes", "flat"];

    /// Parse an engine name, case-insensitively, ignoring surrounding
    /// whitespace. Idempotent over [`PptxEngine::as_str`].
    pub fn parse(name: &str) -> Result<Self, Doc2MdError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "shapes" => Ok(Self::Shapes),
            "flat" => Ok(Self::Flat),
            _ => Err(unknown_engine(name, Self::NAMES)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shapes => "shapes",
            Self::Flat => "flat",
        }
    }

    /// Both PPTX engines are pure parsers with no external capability.
    /// The multimodal path has its own checks (provider, office suite).
    pub fn check_available(&self, _llm: &LlmOptions) -> Result<(), Doc2MdError> {
        Ok(())
    }
}

impl fmt::Display for PptxEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PptxEngine {
    type Err = Doc2MdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn unknown_engine(name: &str, choices: &[&str]) -> Doc2MdError {
    Doc2MdError::UnknownEngine {
        name: name.trim().to_string(),
        choices: choices.join(", "),
    }
}
