//! Structural text extraction for the `pdfium` engine.
//!
//! Pulls the embedded text layer out of each selected page. Fast, offline
//! and deterministic, but the output is plain paragraphs: headings, tables
//! and reading-order subtleties are whatever the PDF's text layer encodes.
//! Scanned PDFs have no text layer at all and yield empty output; the
//! vision engine is the answer there.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{PageList, PdfOptions};
use crate::error::Doc2MdError;
use crate::postprocess::collapse_blank_runs;
use crate::raster;

pub(crate) async fn extract_text(
    pdf_path: &Path,
    options: &PdfOptions,
) -> Result<String, Doc2MdError> {
    let path = pdf_path.to_path_buf();
    let pages = options.pages.clone();
    tokio::task::spawn_blocking(move || extract_text_blocking(&path, pages.as_ref()))
        .await
        .map_err(|e| Doc2MdError::Internal(format!("Text extraction task panicked: {}", e)))?
}

fn extract_text_blocking(
    pdf_path: &Path,
    pages: Option<&PageList>,
) -> Result<String, Doc2MdError> {
    let pdfium = raster::bind_pdfium()?;
    let document = raster::load_document(&pdfium, pdf_path)?;

    let doc_pages = document.pages();
    let total = doc_pages.len() as usize;
    info!("PDF loaded: {} pages", total);

    let indices: Vec<usize> = match pages {
        Some(list) if !list.is_empty() => {
            list.check_in_range(total)?;
            list.indices().to_vec()
        }
        _ => (0..total).collect(),
    };

    let mut parts: Vec<String> = Vec::with_capacity(indices.len());
    for idx in indices {
        let page = doc_pages
            .get(idx as u16)
            .map_err(|e| Doc2MdError::CorruptDocument {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;
        let text = page
            .text()
            .map_err(|e| Doc2MdError::CorruptDocument {
                path: pdf_path.to_path_buf(),
                detail: format!("text layer of page {}: {:?}", idx + 1, e),
            })?
            .all();
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let trimmed = text.trim();
        debug!("Extracted page {} → {} chars", idx + 1, trimmed.len());
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }

    if parts.is_empty() {
        warn!("No text layer found; output is empty. Scanned PDFs need --engine vision");
    }
    Ok(assemble(&parts))
}

/// Join page texts with blank lines and normalise the result.
fn assemble(parts: &[String]) -> String {
    let joined = parts.join("\n\n");
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
    fn pages_joined_with_blank_line() {
        let parts = vec!["Page one text".to_string(), "Page two text".to_string()];
        assert_eq!(assemble(&parts), "Page one text\n\nPage two text\n");
    }

    #[test]
    fn internal_blank_runs_collapse() {
        let parts = vec!["a\n\n\n\nb".to_string()];
        assert_eq!(assemble(&parts), "a\n\nb\n");
    }

    #[test]
    fn no_text_means_empty_output() {
        assert_eq!(assemble(&[]), "");
    }
}
