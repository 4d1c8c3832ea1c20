//! Output path selection and atomic file writing.
//!
//! The CLI's default destination is `output/<stem>.md` under the current
//! directory, mirroring the input's file stem. Writes go through a temp
//! file and rename so an interrupted run never leaves a half-written
//! Markdown file at the destination.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Doc2MdError;
use crate::input::is_url;

/// Default output path for an input: `output/<stem>.md`.
///
/// URLs use the last path segment of the URL (query and fragment
/// stripped); inputs with no usable stem fall back to `output/output.md`.
pub fn default_output_path(input: &str) -> PathBuf {
    let stem = input_stem(input).unwrap_or_else(|| "output".to_string());
    PathBuf::from("output").join(format!("{stem}.md"))
}

fn input_stem(input: &str) -> Option<String> {
    let candidate = if is_url(input) {
        let trimmed = input.split(['?', '#']).next().unwrap_or(input);
        trimmed.trim_end_matches('/').rsplit('/').next()?.to_string()
    } else {
        input.to_string()
    };
    let stem = Path::new(&candidate)
        .file_stem()?
        .to_string_lossy()
        .into_owned();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Write markdown to `path`, creating parent directories as needed.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_output(path: &Path, markdown: &str) -> Result<(), Doc2MdError> {
    let write_err = |e: std::io::Error| Doc2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!(path = %path.display(), bytes = markdown.len(), "Wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_use_the_file_stem() {
        assert_eq!(
            default_output_path("slides/deck.pptx"),
            PathBuf::from("output/deck.md")
        );
        assert_eq!(
            default_output_path("report.pdf"),
            PathBuf::from("output/report.md")
        );
    }

    #[test]
    fn urls_use_the_last_segment() {
        assert_eq!(
            default_output_path("https://example.com/files/deck.pptx?dl=1"),
            PathBuf::from("output/deck.md")
        );
        assert_eq!(
            default_output_path("http://example.com/paper.pdf#page=2"),
            PathBuf::from("output/paper.md")
        );
    }

    #[test]
    fn unusable_stems_fall_back() {
        assert_eq!(default_output_path("."), PathBuf::from("output/output.md"));
        assert_eq!(
            default_output_path("https://example.com/"),
            PathBuf::from("output/example.md")
        );
    }

    #[tokio::test]
    async fn write_creates_parents_and_content_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.md");
        write_output(&path, "# Hello\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Hello\n");
        // No temp file left behind
        assert!(!path.with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_output(&path, "first\n").await.unwrap();
        write_output(&path, "second\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }
}
