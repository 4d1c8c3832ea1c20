//! Resolving user input to a local document path.
//!
//! ## Why a temp file for URLs?
//!
//! pdfium and the zip reader both open documents by path, so downloads land
//! in a `TempDir` whose lifetime is tied to [`ResolvedInput`]: dropping the
//! resolved input deletes the file, panic or not. The first four bytes
//! (`%PDF-` / `PK\x03\x04`) are checked up front, turning what would be a
//! parser failure deep inside a library into a clear error at the door.

use crate::error::Doc2MdError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// The document format an input is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Pdf,
    Pptx,
}

impl InputFormat {
    /// Expected file extension, with the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Pdf => ".pdf",
            InputFormat::Pptx => ".pptx",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InputFormat::Pdf => "PDF",
            InputFormat::Pptx => "PPTX",
        }
    }

    fn default_filename(&self) -> &'static str {
        match self {
            InputFormat::Pdf => "downloaded.pdf",
            InputFormat::Pptx => "downloaded.pptx",
        }
    }

    fn magic_matches(&self, magic: &[u8; 4]) -> bool {
        match self {
            InputFormat::Pdf => magic == b"%PDF",
            // PPTX is an OPC zip archive.
            InputFormat::Pptx => magic == b"PK\x03\x04",
        }
    }
}

/// A local document path, owning the temp directory when it came from a URL.
#[derive(Debug)]
pub enum ResolvedInput {
    /// The input string was already a path on disk.
    Local(PathBuf),
    /// The input was a URL; the download sits in a temp directory that is
    /// kept alive until processing ends.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// The on-disk path, wherever it came from.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// True when the input names an HTTP(S) URL rather than a file.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local document path.
///
/// URLs are downloaded to a temporary directory. Local paths are validated:
/// they must exist, carry the expected extension, be readable, and start
/// with the format's magic bytes.
pub async fn resolve_input(
    input: &str,
    format: InputFormat,
) -> Result<ResolvedInput, Doc2MdError> {
    if input.trim().is_empty() {
        return Err(Doc2MdError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, format).await
    } else {
        resolve_local(input, format)
    }
}

fn resolve_local(path_str: &str, format: InputFormat) -> Result<ResolvedInput, Doc2MdError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Doc2MdError::FileNotFound { path });
    }

    let extension_ok = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(&format.extension()[1..]))
        .unwrap_or(false);
    if !extension_ok {
        return Err(Doc2MdError::WrongExtension {
            expected: format.extension(),
            path,
        });
    }

    // Opening the file doubles as the read-permission check
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && !format.magic_matches(&magic) {
                return Err(Doc2MdError::WrongMagic {
                    expected: format.label(),
                    path,
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Doc2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Doc2MdError::FileNotFound { path });
        }
    }

    debug!("Resolved local {}: {}", format.label(), path.display());
    Ok(ResolvedInput::Local(path))
}

/// Fetch a URL into a fresh temp directory.
///
/// URLs skip the extension check; the magic bytes decide.
async fn download_url(url: &str, format: InputFormat) -> Result<ResolvedInput, Doc2MdError> {
    info!("Downloading {} from: {}", format.label(), url);

    let failed = |reason: String| Doc2MdError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed(format!("timed out after {DOWNLOAD_TIMEOUT_SECS}s"))
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = extract_filename(url, format);

    let temp_dir = TempDir::new().map_err(|e| Doc2MdError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Doc2MdError::Internal(format!("Failed to write temp file: {}", e)))?;

    if bytes.len() >= 4 {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        if !format.magic_matches(&magic) {
            return Err(Doc2MdError::WrongMagic {
                expected: format.label(),
                path: file_path,
                magic,
            });
        }
    }

    info!(path = %file_path.display(), bytes = bytes.len(), "Download complete");

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str, format: InputFormat) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    format.default_filename().to_string()
}
