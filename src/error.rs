//! Error types for the doc2md library.
//!
//! One fatal error type, [`Doc2MdError`], covers every way a conversion can
//! fail: bad input file, wrong extension, unknown or unavailable engine,
//! external-tool failure, provider not configured. It is returned as
//! `Err(Doc2MdError)` from the top-level `convert*` functions and mapped to
//! exit code 1 at the CLI boundary.
//!
//! Per-page and per-slide LLM failures in the vision paths are deliberately
//! *not* represented here: they degrade to placeholder blocks and a warning
//! log, and only surface as [`Doc2MdError::AllPagesFailed`] /
//! [`Doc2MdError::AllSlidesFailed`] when nothing at all succeeded.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2md library.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input resolution ──────────────────────────────────────────────────
    /// No file exists at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists but cannot be opened for reading.
    #[error("Permission denied reading '{path}'\nMake the file readable (chmod +r) and retry.")]
    PermissionDenied { path: PathBuf },

    /// The input string cannot name a document at all.
    #[error("Invalid input '{input}': expected a file path or an HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The URL was accepted but the download did not complete.
    #[error("Failed to download '{url}': {reason}\nCheck the URL and your network connection.")]
    DownloadFailed { url: String, reason: String },

    /// The input path does not carry the extension the converter expects.
    #[error("Expected {expected} file, got: '{path}'")]
    WrongExtension {
        expected: &'static str,
        path: PathBuf,
    },

    /// The file exists and was read, but its magic bytes are wrong.
    #[error("File is not a valid {expected} file: '{path}'\nFirst bytes: {magic:?}")]
    WrongMagic {
        expected: &'static str,
        path: PathBuf,
        magic: [u8; 4],
    },

    /// Page/slide list argument could not be parsed.
    #[error("Invalid page list '{input}': {detail}\nUse comma-separated 0-based indices and ranges, e.g. \"0,2-4\".")]
    InvalidPageList { input: String, detail: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The requested engine name is not recognised.
    #[error("Unknown engine: '{name}'. Choose from: {choices}.")]
    UnknownEngine { name: String, choices: String },

    /// The engine exists but a capability it needs is missing.
    #[error("Engine '{engine}' is not available.\n{hint}")]
    EngineUnavailable {
        engine: &'static str,
        hint: String,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document cannot be parsed (broken zip, broken xref, bad XML).
    #[error("Document '{path}' is corrupt or unreadable: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// Encrypted PDF with no way to supply a password.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A selected page index is past the end of the document.
    #[error("Page {page} is out of range: the document has {total} pages")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium failed on one specific page.
    #[error("Rasterising page {page} failed: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── External tool errors ──────────────────────────────────────────────
    /// The office-suite slide renderer is missing or failed.
    #[error("Slide rendering failed: {detail}\n{hint}")]
    RenderToolFailed { detail: String, hint: String },

    // ── LLM paths ─────────────────────────────────────────────────────────
    /// No provider could be initialised (missing API key etc.).
    #[error("LLM provider '{provider}' could not be initialised.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A provider call came back with an error.
    #[error("LLM request failed: {message}")]
    LlmApiError { message: String },

    /// Every page failed; output would be empty.
    #[error("All {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    /// Every slide failed; output would be empty.
    #[error("All {total} slides failed.\nFirst error: {first_error}")]
    AllSlidesFailed { total: usize, first_error: String },

    // ── Output ────────────────────────────────────────────────────────────
    /// Creating or writing the output Markdown file failed.
    #[error("Could not write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding ────────────────────────────────────────────────────
    /// No pdfium library could be located and bound.
    #[error(
        "Could not bind a pdfium library: {0}\n\n\
The PDF engines need pdfium. Make it discoverable by either:\n\
  • setting PDFIUM_LIB_PATH=/path/to/libpdfium,\n\
  • placing libpdfium next to the executable, or\n\
  • installing it system-wide (libpdfium.so / libpdfium.dylib / pdfium.dll).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// A bug in this crate or a dependency.
    #[error("Internal error: {0}")]
    Internal(String),
}
