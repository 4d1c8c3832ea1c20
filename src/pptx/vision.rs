//! Multimodal PPTX conversion: render slides, transcribe with a VLM.
//!
//! Shape extraction cannot see charts, SmartArt, ink or carefully arranged
//! visuals. This engine sidesteps all of that by converting the deck to PDF
//! with LibreOffice, rasterising each page, and asking a vision model to
//! transcribe what a human would read off the slide.
//!
//! A slide whose transcription fails becomes a placeholder block so slide
//! numbering stays aligned with the deck; the conversion only errors out
//! when every slide failed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{effective_max_pixels, PptxOptions};
use crate::error::Doc2MdError;
use crate::llm::{resolve_provider, transcribe_image};
use crate::postprocess::{clean_vlm_markdown, collapse_blank_runs};
use crate::prompts::SLIDE_PROMPT;
use crate::raster;

/// LibreOffice can stall on damaged decks; bound the conversion.
const SOFFICE_TIMEOUT_SECS: u64 = 120;

const INSTALL_HINT: &str =
    "Install LibreOffice so a 'soffice' or 'libreoffice' binary is on PATH.";

pub(crate) async fn convert_multimodal(
    path: &Path,
    options: &PptxOptions,
) -> Result<String, Doc2MdError> {
    let soffice = find_soffice().await?;
    let temp_dir = TempDir::new().map_err(|e| Doc2MdError::Internal(e.to_string()))?;
    let pdf = convert_to_pdf(soffice, path, temp_dir.path()).await?;

    let max_pixels = effective_max_pixels(options.max_rendered_pixels);
    let pages = raster::render_pages(&pdf, max_pixels, None).await?;
    let total = pages.len();
    info!(slides = total, "Rendered deck; transcribing slides");

    let provider = resolve_provider(&options.llm).await?;

    let mut blocks = Vec::with_capacity(total);
    let mut failures = 0usize;
    let mut first_error: Option<String> = None;

    for (idx, image) in &pages {
        let number = idx + 1;
        info!(slide = number, total, "Transcribing slide");
        let outcome = match raster::encode_image(image) {
            Ok(data) => {
                transcribe_image(
                    &provider,
                    SLIDE_PROMPT,
                    &format!("Slide {number}"),
                    data,
                    &options.llm,
                )
                .await
            }
            Err(e) => Err(e),
        };
        match outcome {
            Ok(text) => blocks.push(clean_vlm_markdown(&text)),
            Err(e) => {
                warn!(slide = number, error = %e, "Slide transcription failed; emitting placeholder");
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
                failures += 1;
                blocks.push(fallback_block(number));
            }
        }
    }

    if total > 0 && failures == total {
        return Err(Doc2MdError::AllSlidesFailed {
            total,
            first_error: first_error.unwrap_or_default(),
        });
    }
    Ok(assemble(&blocks))
}

/// Locate a working LibreOffice binary.
async fn find_soffice() -> Result<&'static str, Doc2MdError> {
    for candidate in ["soffice", "libreoffice"] {
        let probe = Command::new(candidate).arg("--version").output();
        if let Ok(Ok(out)) = timeout(Duration::from_secs(10), probe).await {
            if out.status.success() {
                debug!(tool = candidate, "Found slide renderer");
                return Ok(candidate);
            }
        }
    }
    Err(Doc2MdError::RenderToolFailed {
        detail: "no LibreOffice binary found".to_string(),
        hint: INSTALL_HINT.to_string(),
    })
}

async fn convert_to_pdf(
    soffice: &str,
    pptx: &Path,
    outdir: &Path,
) -> Result<PathBuf, Doc2MdError> {
    debug!(tool = soffice, path = %pptx.display(), "Converting deck to PDF");
    let run = Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(outdir)
        .arg(pptx)
        .output();
    let output = timeout(Duration::from_secs(SOFFICE_TIMEOUT_SECS), run)
        .await
        .map_err(|_| Doc2MdError::RenderToolFailed {
            detail: format!("{soffice} timed out after {SOFFICE_TIMEOUT_SECS}s"),
            hint: INSTALL_HINT.to_string(),
        })?
        .map_err(|e| Doc2MdError::RenderToolFailed {
            detail: format!("failed to run {soffice}: {e}"),
            hint: INSTALL_HINT.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Doc2MdError::RenderToolFailed {
            detail: format!("{soffice} exited with {}: {}", output.status, stderr.trim()),
            hint: "Check that LibreOffice can open the file manually.".to_string(),
        });
    }

    let stem = pptx
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    let pdf = outdir.join(format!("{stem}.pdf"));
    if !pdf.is_file() {
        return Err(Doc2MdError::RenderToolFailed {
            detail: format!("{soffice} reported success but produced no PDF"),
            hint: "Check that LibreOffice can open the file manually.".to_string(),
        });
    }
    Ok(pdf)
}

/// Placeholder emitted for a slide whose transcription failed.
fn fallback_block(number: usize) -> String {
    format!("## Slide {number}\n**Type**: Content Slide\n\n### Content\n")
}

/// Join transcribed blocks into the final document.
fn assemble(blocks: &[String]) -> String {
    let joined = blocks.join("\n\n---\n\n");
    let collapsed = collapse_blank_runs(&joined);
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_block_keeps_slide_template() {
        let block = fallback_block(4);
        assert!(block.starts_with("## Slide 4\n"));
        assert!(block.contains("**Type**: Content Slide"));
        assert!(block.ends_with("### Content\n"));
    }

    #[test]
    fn assemble_joins_with_rules_and_normalises() {
        let blocks = vec![
            "## Slide 1\ntext\n".to_string(),
            "## Slide 2\nmore\n".to_string(),
        ];
        let doc = assemble(&blocks);
        assert_eq!(doc, "## Slide 1\ntext\n\n---\n\n## Slide 2\nmore\n");
    }

    #[test]
    fn assemble_empty_is_empty() {
        assert_eq!(assemble(&[]), "");
        assert_eq!(assemble(&["  \n".to_string()]), "");
    }
}
