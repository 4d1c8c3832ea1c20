//! # doc2md
//!
//! Convert PDF and PPTX documents to Markdown.
//!
//! ## Why this crate?
//!
//! Getting documents into Markdown usually means gluing together a PDF text
//! extractor, a PPTX parser and an LLM wrapper, each with its own failure
//! modes. This crate ships both formats behind one small API with pluggable
//! engines per format: fast offline extraction by default, vision-model
//! transcription when fidelity matters more than cost, and an optional LLM
//! polish pass over whatever came out.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF                                  PPTX
//!  │                                    │
//!  ├─ input    local file or URL        ├─ input    local file or URL
//!  ├─ engine   pdfium: text layer       ├─ engine   shapes: zip + XML parse,
//!  │           vision: rasterise +      │             layout heuristics,
//!  │             VLM per page           │             tables, math → template
//!  │                                    │           flat: raw text dump
//!  │                                    │           --multimodal: LibreOffice
//!  │                                    │             render + VLM per slide
//!  └─ polish   optional LLM cleanup ◀───┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2md::{convert, convert_pptx, PdfOptions, PptxOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let markdown = convert("report.pdf", &PdfOptions::default()).await?;
//!     println!("{markdown}");
//!
//!     let slides = convert_pptx("deck.pptx", &PptxOptions::default()).await?;
//!     println!("{slides}");
//!     Ok(())
//! }
//! ```
//!
//! ## Engines
//!
//! | Format | Engine | Requires | Best for |
//! |--------|--------|----------|----------|
//! | PDF  | `pdfium` (default) | pdfium library | Digital PDFs with a text layer; honours `--pages` |
//! | PDF  | `vision` | LLM API key + pdfium | Scans, multi-column layouts, tables |
//! | PPTX | `shapes` (default) | nothing | Structured slide blocks with titles, bullets, tables, math |
//! | PPTX | `flat` | nothing | Raw text when the heuristics guess wrong |
//! | PPTX | `--multimodal` | LLM API key + LibreOffice | Charts, SmartArt, visual-heavy decks |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` and `pptx2md` binaries (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! doc2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! The LLM-backed paths default to `gpt-4.1-nano`; any vision-capable model
//! known to `edgequake-llm` works.
//!
//! | Model | $/1M in/out | Notes |
//! |-------|-------------|-------|
//! | `gpt-4.1-nano` | $0.10 / $0.40 | Default; cheapest transcription that stays accurate |
//! | `gpt-4.1-mini` | $0.40 / $1.60 | Better on dense tables |
//! | `claude-sonnet-4-20250514` | $3.00 / $15.00 | Complex layouts, scanned forms |
//! | `gemini-2.0-flash` | $0.10 / $0.40 | Cheap alternative to nano |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod prompts;

mod input;
mod llm;
mod omml;
mod pdf;
mod postprocess;
mod pptx;
mod raster;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{LlmOptions, PageList, PdfOptions, PptxOptions};
pub use engine::{PdfEngine, PptxEngine};
pub use error::Doc2MdError;
pub use llm::polish;
pub use output::{default_output_path, write_output};
pub use pdf::{convert, convert_sync};
pub use pptx::{convert_pptx, convert_pptx_sync};
