//! PDF-to-Markdown conversion.
//!
//! Two engines with very different trade-offs:
//!
//! - [`text`] (`pdfium`, the default) — read the embedded text layer.
//!   Offline, fast, honours `--pages`.
//! - [`vision`] — rasterise pages and transcribe them with a VLM. Handles
//!   scans and complex layouts, needs a provider and converts whole
//!   documents only.

mod text;
mod vision;

use tracing::{info, warn};

use crate::config::PdfOptions;
use crate::engine::PdfEngine;
use crate::error::Doc2MdError;
use crate::input::{resolve_input, InputFormat};

/// Convert one PDF, on disk or behind a URL, to Markdown.
///
/// # Arguments
/// * `input` — filesystem path or HTTP(S) URL of the PDF
/// * `options` — engine choice plus page and LLM settings
///
/// # Errors
/// - File not found / wrong extension / not a PDF
/// - Encrypted or corrupt documents, pages out of range
/// - `vision` engine without a configured LLM provider
/// - All pages failed under `vision`
pub async fn convert(
    input: impl AsRef<str>,
    options: &PdfOptions,
) -> Result<String, Doc2MdError> {
    let input = input.as_ref();
    info!("Converting PDF: {}", input);

    // ── Resolve the input ────────────────────────────────────────────────
    // Input problems surface first, before any provider checks.
    let resolved = resolve_input(input, InputFormat::Pdf).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Engine availability ──────────────────────────────────────────────
    options.engine.check_available(&options.llm)?;

    // ── Convert ──────────────────────────────────────────────────────────
    let markdown = match options.engine {
        PdfEngine::Pdfium => text::extract_text(&pdf_path, options).await?,
        PdfEngine::Vision => {
            if options.pages.as_ref().is_some_and(|p| !p.is_empty()) {
                warn!("Page selection is not supported by the vision engine; converting every page");
            }
            vision::convert_vision(&pdf_path, options).await?
        }
    };
    info!(bytes = markdown.len(), "PDF conversion complete");
    Ok(markdown)
}

/// Blocking variant of [`convert`] for callers without an async runtime.
///
/// Builds a throwaway tokio runtime on every call.
pub fn convert_sync(
    input: impl AsRef<str>,
    options: &PdfOptions,
) -> Result<String, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, options))
}
