//! End-to-end tests for doc2md against real documents.
//!
//! These tests use real files in `./test_cases/` and, for the vision and
//! polish paths, make live LLM API calls. They are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! The pdfium tests need a pdfium dynamic library next to the binary or on
//! the loader path (set `PDFIUM_LIB_PATH` to its directory if elsewhere).
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e pdfium_extracts -- --nocapture

use std::path::PathBuf;

use doc2md::{
    convert, convert_pptx, polish, Doc2MdError, LlmOptions, PageList, PdfEngine, PdfOptions,
    PptxEngine, PptxOptions,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* no document at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("skipping: set E2E_ENABLED=1 to run the e2e suite");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("skipping: no test document at {}", p.display());
            return;
        }
        p
    }};
}

/// Skip unless a live LLM provider is configured in the environment.
macro_rules! e2e_skip_unless_provider {
    () => {
        if std::env::var("OPENAI_API_KEY").is_err()
            && std::env::var("ANTHROPIC_API_KEY").is_err()
            && std::env::var("GEMINI_API_KEY").is_err()
            && std::env::var("EDGEQUAKE_LLM_PROVIDER").is_err()
        {
            println!("skipping: no LLM provider configured (set OPENAI_API_KEY or similar)");
            return;
        }
    };
}

/// Assert the markdown passes basic quality checks.
fn assert_markdown_quality(md: &str, context: &str) {
    assert!(!md.trim().is_empty(), "[{context}] Markdown is empty");

    // Must end with exactly one newline (normalised by the post-processor)
    assert!(
        md.ends_with('\n') && !md.ends_with("\n\n"),
        "[{context}] Markdown must end with a single newline"
    );

    // Must not be one big fence wrapping the whole output
    let first_line = md.lines().next().unwrap_or("");
    assert!(
        !first_line.starts_with("```"),
        "[{context}] Output must not start with a code fence, got: {first_line:?}"
    );

    // No blank-line runs longer than one empty line
    assert!(
        !md.contains("\n\n\n"),
        "[{context}] Output has uncollapsed blank-line runs"
    );

    println!("[{context}] ✓  {} bytes, quality checks passed", md.len());
}

// ── pdfium engine (no LLM) ──────────────────────────────────────────────────

#[tokio::test]
async fn pdfium_extracts_text_from_sample() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let out_path = output_dir().join("sample_pdfium.md");

    let markdown = convert(path.to_str().unwrap(), &PdfOptions::default())
        .await
        .expect("pdfium extraction should succeed");

    assert_markdown_quality(&markdown, "pdfium-sample");

    std::fs::write(&out_path, &markdown).ok();
    println!("[pdfium-sample] Saved to {}", out_path.display());
}

#[tokio::test]
async fn pdfium_page_subset_is_smaller_than_full_document() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let full = convert(path.to_str().unwrap(), &PdfOptions::default())
        .await
        .expect("full conversion should succeed");

    let options = PdfOptions {
        pages: Some(PageList::parse("0").unwrap()),
        ..PdfOptions::default()
    };
    let subset = convert(path.to_str().unwrap(), &options)
        .await
        .expect("page-subset conversion should succeed");

    assert!(
        subset.len() <= full.len(),
        "page 0 alone ({}) should not exceed the full document ({})",
        subset.len(),
        full.len()
    );
}

#[tokio::test]
async fn pdfium_out_of_range_page_is_an_error() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let options = PdfOptions {
        pages: Some(PageList::parse("5000").unwrap()),
        ..PdfOptions::default()
    };
    let err = convert(path.to_str().unwrap(), &options)
        .await
        .expect_err("page 5000 should be out of range");
    assert!(matches!(err, Doc2MdError::PageOutOfRange { .. }), "{err}");
}

// ── PPTX engines on a real deck (no LLM) ────────────────────────────────────

#[tokio::test]
async fn pptx_shapes_engine_converts_real_deck() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pptx"));
    let out_path = output_dir().join("sample_shapes.md");

    let markdown = convert_pptx(path.to_str().unwrap(), &PptxOptions::default())
        .await
        .expect("shapes conversion should succeed");

    assert_markdown_quality(&markdown, "pptx-shapes");
    assert!(
        markdown.contains("## Slide 1"),
        "First slide heading missing"
    );
    assert!(markdown.contains("**Type**: "), "Type line missing");

    std::fs::write(&out_path, &markdown).ok();
    println!("[pptx-shapes] Saved to {}", out_path.display());
}

#[tokio::test]
async fn pptx_flat_engine_converts_real_deck() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pptx"));

    let markdown = convert_pptx(
        path.to_str().unwrap(),
        &PptxOptions::with_engine(PptxEngine::Flat),
    )
    .await
    .expect("flat conversion should succeed");

    assert_markdown_quality(&markdown, "pptx-flat");
    assert!(markdown.contains("**Type**: Content Slide"));
}

// ── LLM-backed paths (need an API key) ──────────────────────────────────────

#[tokio::test]
async fn vision_engine_transcribes_a_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    e2e_skip_unless_provider!();
    let out_path = output_dir().join("sample_vision.md");

    let options = PdfOptions {
        engine: PdfEngine::Vision,
        // Keep the payload small for a cheap, fast call.
        max_rendered_pixels: 1200,
        ..PdfOptions::default()
    };
    let markdown = convert(path.to_str().unwrap(), &options)
        .await
        .expect("vision conversion should succeed");

    assert_markdown_quality(&markdown, "vision");

    std::fs::write(&out_path, &markdown).ok();
    println!("[vision] Saved to {}", out_path.display());
}

#[tokio::test]
async fn polish_rewrites_rough_markdown() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("skipping: set E2E_ENABLED=1 to run the e2e suite");
        return;
    }
    e2e_skip_unless_provider!();

    let rough = "Invoice No 42\nDate 2025-01-01\nTotal    : 99,00 EUR\n";
    let polished = polish(rough, &LlmOptions::default())
        .await
        .expect("polish should succeed");

    assert!(
        !polished.trim().is_empty(),
        "polished output must not be empty"
    );
    println!("--- BEGIN POLISHED ---\n{polished}\n--- END POLISHED ---");
}

#[tokio::test]
async fn multimodal_pptx_transcribes_a_deck() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pptx"));
    e2e_skip_unless_provider!();

    // Also needs LibreOffice for the PDF rendering step.
    let have_soffice = std::process::Command::new("soffice")
        .arg("--version")
        .output()
        .is_ok();
    if !have_soffice {
        println!("skipping: no soffice binary on PATH (install LibreOffice)");
        return;
    }
    let out_path = output_dir().join("sample_multimodal.md");

    let options = PptxOptions {
        multimodal: true,
        max_rendered_pixels: 1200,
        ..PptxOptions::default()
    };
    let markdown = convert_pptx(path.to_str().unwrap(), &options)
        .await
        .expect("multimodal conversion should succeed");

    assert_markdown_quality(&markdown, "multimodal");
    assert!(
        markdown.contains("## Slide 1"),
        "Transcription should keep the slide heading template"
    );

    std::fs::write(&out_path, &markdown).ok();
    println!("[multimodal] Saved to {}", out_path.display());
}
