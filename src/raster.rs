//! Page rasterisation: render PDF pages to images via pdfium, and encode
//! them for the vision APIs. Shared by the PDF `vision` engine and the PPTX
//! multimodal path (which rasterises the office-suite-produced PDF).
//!
//! ## Why a blocking task?
//!
//! pdfium is a C++ library with internal thread-local state; its calls are
//! synchronous and CPU-bound. Everything that touches it runs inside
//! `tokio::task::spawn_blocking` so the async worker threads never stall on
//! a render.
//!
//! ## Why cap the longest edge?
//!
//! Physical page sizes are unbounded; a poster-sized page rendered at a
//! fixed DPI can reach tens of thousands of pixels per edge. Capping the
//! longest edge at `max_pixels` keeps memory bounded and lands in the
//! resolution range current vision models actually resolve (roughly
//! 1,024–2,048 px).

use crate::error::Doc2MdError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bind to a pdfium library: `PDFIUM_LIB_PATH` override first, then a copy
/// next to the executable, then the system library.
pub(crate) fn bind_pdfium() -> Result<Pdfium, Doc2MdError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib) if !lib.is_empty() => Pdfium::bind_to_library(&lib),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Doc2MdError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Load a PDF, mapping pdfium's load errors onto the crate taxonomy.
pub(crate) fn load_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
) -> Result<PdfDocument<'a>, Doc2MdError> {
    pdfium.load_pdf_from_file(path, None).map_err(|e| {
        let detail = format!("{e:?}");
        // Pdfium reports encrypted files as a password error.
        if detail.to_ascii_lowercase().contains("password") {
            Doc2MdError::PasswordRequired {
                path: path.to_path_buf(),
            }
        } else {
            Doc2MdError::CorruptDocument {
                path: path.to_path_buf(),
                detail,
            }
        }
    })
}

/// Rasterise pages of a PDF into images.
///
/// `page_indices: None` renders every page. Out-of-range indices are
/// skipped with a warning. Returns `(page_index_0based, image)` tuples in
/// request order.
pub async fn render_pages(
    pdf_path: &Path,
    max_pixels: u32,
    page_indices: Option<&[usize]>,
) -> Result<Vec<(usize, DynamicImage)>, Doc2MdError> {
    let path = pdf_path.to_path_buf();
    let indices = page_indices.map(|s| s.to_vec());

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, max_pixels, indices))
        .await
        .map_err(|e| Doc2MdError::Internal(format!("Render task panicked: {}", e)))?
}

fn render_pages_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    page_indices: Option<Vec<usize>>,
) -> Result<Vec<(usize, DynamicImage)>, Doc2MdError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!(pages = total, path = %pdf_path.display(), "Opened PDF for rendering");

    let indices = page_indices.unwrap_or_else(|| (0..total).collect());

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut rendered = Vec::with_capacity(indices.len());

    for idx in indices {
        if idx >= total {
            warn!(page = idx + 1, total, "Skipping out-of-range page");
            continue;
        }

        let raster_err = |e: PdfiumError| Doc2MdError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{e:?}"),
        };
        let page = pages.get(idx as u16).map_err(raster_err)?;
        let bitmap = page.render_with_config(&render_config).map_err(raster_err)?;

        let image = bitmap.as_image();
        debug!(
            page = idx + 1,
            width = image.width(),
            height = image.height(),
            "Rendered page"
        );
        rendered.push((idx, image));
    }

    Ok(rendered)
}

/// Encode a rasterised page as a base64 PNG ready for the vision API.
///
/// PNG, not JPEG: compression artefacts on rendered text are exactly what
/// trips up transcription models. `detail: "high"` asks GPT-4-class models
/// for full-resolution tiling so fine print and small tables stay legible.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, Doc2MdError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| Doc2MdError::Internal(format!("PNG encoding failed: {e}")))?;

    let encoded = STANDARD.encode(&png);
    debug!(bytes = encoded.len(), "Encoded page image as base64 PNG");

    Ok(ImageData::new(encoded, "image/png").with_detail("high"))
}
