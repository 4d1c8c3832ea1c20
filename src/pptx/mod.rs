//! PPTX-to-Markdown conversion.
//!
//! ## Data flow
//!
//! ```text
//! input ──▶ package ──▶ classify ──▶ markdown
//! (URL/path) (zip+XML)  (heuristics)  (render)
//! ```
//!
//! 1. [`package`]  — open the OPC zip, parse presentation order, layouts and
//!    shape trees into a [`model::SlideDeck`]
//! 2. [`classify`] — slide types from layout names, title/subtitle from
//!    placeholder roles, reading order from shape positions
//! 3. [`markdown`] — render the structured `## Slide N` blocks
//!
//! The `flat` engine swaps steps 2–3 for position-free text dumping, and
//! `--multimodal` replaces the whole chain with [`vision`]: LibreOffice
//! renders the deck and a VLM transcribes each slide image.

mod classify;
mod flat;
mod markdown;
mod model;
mod package;
mod vision;

use tracing::{debug, info, warn};

use crate::config::PptxOptions;
use crate::engine::{require_provider_configured, PptxEngine};
use crate::error::Doc2MdError;
use crate::input::{resolve_input, InputFormat};

/// Convert one PPTX deck, on disk or behind a URL, to Markdown.
///
/// # Arguments
/// * `input` — filesystem path or HTTP(S) URL of the `.pptx` deck
/// * `options` — engine choice plus LLM settings
///
/// # Errors
/// - File not found / wrong extension / not a zip package
/// - `--multimodal` without a configured LLM provider or LibreOffice
/// - All slides failed under `--multimodal`
pub async fn convert_pptx(
    input: impl AsRef<str>,
    options: &PptxOptions,
) -> Result<String, Doc2MdError> {
    let input = input.as_ref();
    info!("Converting PPTX: {}", input);

    // ── Resolve the input ────────────────────────────────────────────────
    // Input problems surface first, before any provider or tool checks.
    let resolved = resolve_input(input, InputFormat::Pptx).await?;
    let pptx_path = resolved.path().to_path_buf();

    if options.slides.is_some() {
        warn!("Slide selection is not supported for PPTX; converting the whole deck");
    }

    // ── Dispatch to an engine ────────────────────────────────────────────
    if options.multimodal {
        require_provider_configured("multimodal", &options.llm)?;
        return vision::convert_multimodal(&pptx_path, options).await;
    }
    options.engine.check_available(&options.llm)?;

    // ── Parse the package ────────────────────────────────────────────────
    // zip + XML decoding is CPU-bound, so it runs off the async runtime.
    let deck = tokio::task::spawn_blocking(move || package::read_deck(&pptx_path))
        .await
        .map_err(|e| Doc2MdError::Internal(format!("Parse task panicked: {}", e)))??;
    debug!(
        slides = deck.slides.len(),
        engine = options.engine.as_str(),
        "Deck parsed"
    );

    // ── Render ───────────────────────────────────────────────────────────
    let markdown = match options.engine {
        PptxEngine::Shapes => markdown::render_deck(&deck),
        PptxEngine::Flat => flat::render_flat(&deck),
    };
    info!(bytes = markdown.len(), "PPTX conversion complete");
    Ok(markdown)
}

/// Blocking variant of [`convert_pptx`] for callers without an async runtime.
///
/// Builds a throwaway tokio runtime on every call.
pub fn convert_pptx_sync(
    input: impl AsRef<str>,
    options: &PptxOptions,
) -> Result<String, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_pptx(input, options))
}
