//! Vision engine: rasterise each page and have a VLM transcribe it.
//!
//! Slower and costs tokens, but reads scanned documents, complex layouts
//! and tables that the text layer mangles. Pages are processed one at a
//! time; a failed page becomes an HTML comment placeholder so the rest of
//! the document still comes out, and the conversion only errors when every
//! page failed.

use std::path::Path;

use tracing::{info, warn};

use crate::config::{effective_max_pixels, PdfOptions};
use crate::error::Doc2MdError;
use crate::llm::{resolve_provider, transcribe_image};
use crate::postprocess::{clean_vlm_markdown, collapse_blank_runs};
use crate::prompts::PDF_PAGE_PROMPT;
use crate::raster;

pub(crate) async fn convert_vision(
    pdf_path: &Path,
    options: &PdfOptions,
) -> Result<String, Doc2MdError> {
    let max_pixels = effective_max_pixels(options.max_rendered_pixels);
    let pages = raster::render_pages(pdf_path, max_pixels, None).await?;
    let total = pages.len();
    info!(pages = total, "Rendered document; transcribing pages");

    let provider = resolve_provider(&options.llm).await?;

    let mut blocks = Vec::with_capacity(total);
    let mut failures = 0usize;
    let mut first_error: Option<String> = None;

    for (idx, image) in &pages {
        let number = idx + 1;
        info!(page = number, total, "Transcribing page");
        let outcome = match raster::encode_image(image) {
            Ok(data) => {
                transcribe_image(&provider, PDF_PAGE_PROMPT, "", data, &options.llm).await
            }
            Err(e) => Err(e),
        };
        match outcome {
            Ok(text) => blocks.push(clean_vlm_markdown(&text)),
            Err(e) => {
                warn!(page = number, error = %e, "Page transcription failed; emitting placeholder");
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
                failures += 1;
                blocks.push(format!("<!-- page {number}: transcription failed -->\n"));
            }
        }
    }

    if total > 0 && failures == total {
        return Err(Doc2MdError::AllPagesFailed {
            total,
            first_error: first_error.unwrap_or_default(),
        });
    }
    Ok(assemble(&blocks))
}

fn assemble(blocks: &[String]) -> String {
    let joined = blocks.join("\n\n");
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
    fn blocks_joined_and_normalised() {
        let blocks = vec!["# Page 1\n\ntext\n".to_string(), "more\n".to_string()];
        assert_eq!(assemble(&blocks), "# Page 1\n\ntext\n\nmore\n");
    }

    #[test]
    fn empty_input_is_empty_document() {
        assert_eq!(assemble(&[]), "");
    }
}
