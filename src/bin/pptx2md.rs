//! CLI binary for doc2md PPTX conversion.
//!
//! A thin shim over the library crate that maps CLI flags to
//! [`PptxOptions`], runs the conversion, and writes the Markdown file.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use doc2md::{
    convert_pptx, default_output_path, polish, write_output, LlmOptions, PageList, PptxEngine,
    PptxOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default engine (structured slide blocks), writes output/deck.md
  pptx2md deck.pptx

  # Choose the destination
  pptx2md deck.pptx -o notes/deck.md

  # Raw text dump, no layout heuristics
  pptx2md --engine flat deck.pptx

  # Chart-heavy deck: render slides and transcribe with a vision LLM
  pptx2md --multimodal --polish deck.pptx

  # Convert from a URL
  pptx2md https://example.com/all-hands.pptx -o all-hands.md

ENGINES:
  shapes (default)  Parse the slide XML: layout-based slide types,
                    titles, bullet levels, tables, formulas.
  flat              Every text shape in document order, no heuristics.
  --multimodal      Overrides the engine: LibreOffice renders each slide
                    and a vision LLM transcribes it. Needs an API key
                    and a 'soffice' binary on PATH.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key for OpenAI models
  ANTHROPIC_API_KEY       API key for Anthropic models
  GEMINI_API_KEY          API key for Google Gemini models
  EDGEQUAKE_LLM_PROVIDER  Force a provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Force a model ID
  PDFIUM_LIB_PATH         Use this libpdfium instead of searching (--multimodal)

  Variables can also be placed in a .env file in the working directory.

SETUP:
  1. Convert: pptx2md deck.pptx  (no external tools needed)
  2. For --multimodal: install LibreOffice and pdfium, and
     export OPENAI_API_KEY=sk-...
"#;

/// Convert PPTX files and URLs to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pptx2md",
    version,
    about = "Convert PPTX files and URLs to Markdown",
    long_about = "Convert PowerPoint decks (local files or URLs) to Markdown. The default \
engine parses the slide XML into structured blocks with slide types, titles, bullets, \
tables and formulas; --multimodal renders each slide and transcribes it with a vision LLM.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PPTX file path or HTTP/HTTPS URL.
    input: String,

    /// Write Markdown here instead of output/<stem>.md.
    #[arg(short, long, env = "PPTX2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Conversion engine: shapes (structured) or flat (raw text).
    #[arg(long, env = "PPTX2MD_ENGINE", default_value = "shapes")]
    engine: String,

    /// Render slides with LibreOffice and transcribe them with a vision
    /// LLM instead of parsing shapes. Overrides --engine.
    #[arg(long, env = "PPTX2MD_MULTIMODAL")]
    multimodal: bool,

    /// Slide selection, 0-based: "0", "0-2", "0,2-4".
    /// Accepted for symmetry with pdf2md but not yet supported; the whole
    /// deck is converted.
    #[arg(long, env = "PPTX2MD_SLIDES")]
    slides: Option<String>,

    /// Longest rendered slide edge in pixels (--multimodal).
    #[arg(long, env = "PPTX2MD_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Run an LLM polish pass over the converted Markdown.
    #[arg(long, env = "PPTX2MD_POLISH")]
    polish: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Provider for LLM calls: openai, anthropic, gemini, ollama.
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature for LLM calls (0.0 to 2.0).
    #[arg(long, env = "PPTX2MD_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "PPTX2MD_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "PPTX2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Verbose logging (DEBUG level).
    #[arg(short, long, env = "PPTX2MD_VERBOSE")]
    verbose: bool,

    /// Log errors only and disable the spinner.
    #[arg(short, long, env = "PPTX2MD_QUIET")]
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
    let engine = PptxEngine::parse(&cli.engine)?;
    let slides = match cli.slides.as_deref() {
        Some(s) => Some(PageList::parse(s)?),
        None => None,
    };
    let options = PptxOptions {
        engine,
        slides,
        multimodal: cli.multimodal,
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
    let result = convert_pptx(&cli.input, &options).await;
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
