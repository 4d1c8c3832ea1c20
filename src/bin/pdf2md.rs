//! CLI binary for doc2md PDF conversion.
//!
//! A thin shim over the library crate that maps CLI flags to
//! [`PdfOptions`], runs the conversion, and writes the Markdown file.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use doc2md::{
    convert, default_output_path, polish, write_output, LlmOptions, PageList, PdfEngine,
    PdfOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default engine (text layer), writes output/report.md
  pdf2md report.pdf

  # Choose the destination
  pdf2md report.pdf -o notes/report.md

  # First three pages only (0-based selection)
  pdf2md --pages 0-2 report.pdf

  # Vision transcription for scans, with an LLM polish pass
  pdf2md --engine vision --polish scan.pdf

  # Convert from a URL
  pdf2md https://arxiv.org/pdf/2005.11401 -o rag.md

ENGINES:
  pdfium (default)  Extract the embedded text layer via pdfium.
                    Offline, fast, honours --pages.
  vision            Rasterise each page and transcribe it with a vision
                    LLM. Reads scans and complex layouts; needs an API
                    key and converts whole documents only.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key for OpenAI models
  ANTHROPIC_API_KEY       API key for Anthropic models
  GEMINI_API_KEY          API key for Google Gemini models
  EDGEQUAKE_LLM_PROVIDER  Force a provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Force a model ID
  PDFIUM_LIB_PATH         Use this libpdfium instead of searching

  Variables can also be placed in a .env file in the working directory.

SETUP:
  1. Install pdfium (libpdfium.so / .dylib / .dll) system-wide, next to
     the executable, or point PDFIUM_LIB_PATH at it.
  2. For --engine vision or --polish: export OPENAI_API_KEY=sk-...
  3. Convert: pdf2md document.pdf
"#;

/// Convert PDF files and URLs to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert PDF files and URLs to Markdown",
    long_about = "Convert PDF documents (local files or URLs) to Markdown. The default \
engine reads the embedded text layer offline; the vision engine rasterises pages and \
transcribes them with a vision LLM (OpenAI, Anthropic, Gemini, Ollama, ...).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write Markdown here instead of output/<stem>.md.
    #[arg(short, long, env = "PDF2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Conversion engine: pdfium (text layer) or vision (VLM transcription).
    #[arg(long, env = "PDF2MD_ENGINE", default_value = "pdfium")]
    engine: String,

    /// Page selection, 0-based: "0", "0-2", "0,2-4". Default: all pages.
    #[arg(long, env = "PDF2MD_PAGES")]
    pages: Option<String>,

    /// Longest rendered page edge in pixels (vision engine).
    #[arg(long, env = "PDF2MD_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Run an LLM polish pass over the converted Markdown.
    #[arg(long, env = "PDF2MD_POLISH")]
    polish: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Provider for LLM calls: openai, anthropic, gemini, ollama.
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature for LLM calls (0.0 to 2.0).
    #[arg(long, env = "PDF2MD_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "PDF2MD_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Verbose logging (DEBUG level).
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Log errors only and disable the spinner.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the spinner active, keep the log stream down to warnings so the
    // two don't fight over stderr.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build options ────────────────────────────────────────────────────
    // Engine names are parsed here rather than by clap so a bad name exits
    // with code 1 like every other handled error.
    let engine = PdfEngine::parse(&cli.engine)?;
    let pages = match cli.pages.as_deref() {
        Some(p) => Some(PageList::parse(p)?),
        None => None,
    };
    let options = PdfOptions {
        engine,
        pages,
        max_rendered_pixels: cli.max_pixels,
        llm: LlmOptions {
            model: cli.model.clone(),
            provider: cli.provider.clone(),
            temperature: cli.temperature,
            max_tokens: cli.max_tokens,
        },
    };

    // ── Convert ──────────────────────────────────────────────────────────
    let spin = progress_spinner(show_progress, format!("Converting {}…", cli.input));
    let result = convert(&cli.input, &options).await;
    if let Some(s) = &spin {
        s.finish_and_clear();
    }
    let mut markdown = result?;

    // ── Optional polish pass ─────────────────────────────────────────────
    // A polish failure is not fatal: the converted document is already in
    // hand, so degrade to the unpolished version with a warning.
    if cli.polish {
        let spin = progress_spinner(show_progress, "Polishing Markdown…".to_string());
        let polished = polish(&markdown, &options.llm).await;
        if let Some(s) = &spin {
            s.finish_and_clear();
        }
        match polished {
            Ok(p) => markdown = p,
            Err(e) => warn!("Polish failed; writing unpolished output: {e}"),
        }
    }

    // ── Write ────────────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    write_output(&output_path, &markdown).await?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn progress_spinner(enabled: bool, msg: String) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(msg);
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}
