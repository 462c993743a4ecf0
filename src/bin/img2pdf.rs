//! CLI binary for edgequake-img2pdf.
//!
//! A thin shim over the library crate: maps CLI flags to `ConversionConfig`,
//! asks whatever the flags left open, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_img2pdf::prompts::Console;
use edgequake_img2pdf::{
    convert_scanned, default_output_path, inspect, ConversionConfig, ConversionProgressCallback, Dimensions,
    Img2PdfError, ProgressCallback, ResizeMode, ScanReport, SelectionRange,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar, one tick per composited page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Hidden until `on_conversion_start` knows the page count, so the bar
    /// never fights with the interactive prompts.
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Composing");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_page_start(&self, _page_num: usize, _total_pages: usize, source: &str) {
        self.bar.set_message(dim(source));
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _resized: bool) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, _output: &Path) {
        self.bar.finish_and_clear();
        eprintln!("{} {} pages written", green("✔"), bold(&total_pages.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: list, ask about resize, range and filename
  img2pdf screenshots/lec2

  # Non-interactive with defaults (all images, no resize, lec2.pdf)
  img2pdf -y screenshots/lec2

  # Pages 2-4, normalized to the most common size
  img2pdf --pages 2-4 --resize yes -o lec2-part.pdf screenshots/lec2

  # Fixed page size, no captions
  img2pdf --resize 1920x1080 --no-caption screenshots/lec2

  # Just look at what is there
  img2pdf --inspect-only --json screenshots/lec2

CAPTIONS:
  Each page gets "<name>   i/total" in a rounded box near the top, where
  <name> is the filename without extension and without "screenshot".
  Fonts are tried in order: --font values, arial.ttf, DejaVuSans.ttf, then
  the macOS Arial paths. If none load, a built-in bitmap font is used.

ENVIRONMENT VARIABLES:
  IMG2PDF_INPUT        Source directory
  IMG2PDF_OUTPUT       Output PDF path
  IMG2PDF_PAGES        Image range, e.g. 1-5 or all
  IMG2PDF_RESIZE       ask, yes, no or WIDTHxHEIGHT
  IMG2PDF_NO_CAPTION   Disable captions
  RUST_LOG             Override the log filter
"#;

/// Combine a directory of screenshots into a single PDF.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Combine a directory of screenshots into a single PDF",
    long_about = "Collect the images in a directory in name order, optionally resize them to the \
size most of them share, caption each page with its name and position, and write one PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory holding the images.
    #[arg(env = "IMG2PDF_INPUT", default_value = ".")]
    input: String,

    /// Output PDF path. Default: <input>.pdf next to the directory.
    #[arg(short, long, env = "IMG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Image range: all or START-END (1-based, inclusive).
    #[arg(long, env = "IMG2PDF_PAGES")]
    pages: Option<String>,

    /// Resize policy: ask, yes, no, or WIDTHxHEIGHT.
    #[arg(long, env = "IMG2PDF_RESIZE", default_value = "ask", value_parser = ResizeArg::from_str)]
    resize: ResizeArg,

    /// Do not draw captions.
    #[arg(long, env = "IMG2PDF_NO_CAPTION")]
    no_caption: bool,

    /// Caption font to try first (path or file name). Repeatable.
    #[arg(long = "font", value_name = "FONT")]
    fonts: Vec<String>,

    /// Accept every default instead of prompting.
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Print the image list and sizes, then exit.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of the console dialogue.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

/// `--resize` values.
#[derive(Clone, Debug, PartialEq)]
enum ResizeArg {
    Ask,
    Yes,
    No,
    To(Dimensions),
}

impl FromStr for ResizeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(ResizeArg::Ask),
            "yes" | "y" => Ok(ResizeArg::Yes),
            "no" | "n" => Ok(ResizeArg::No),
            other => other
                .parse::<Dimensions>()
                .map(ResizeArg::To)
                .map_err(|e| format!("expected ask, yes, no or WIDTHxHEIGHT ({e})")),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the prompts and the bar, so
    // only errors show unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    // ── Directory + scan ─────────────────────────────────────────────────
    let base = match ConversionConfig::builder()
        .input_dir(&cli.input)
        .caption(!cli.no_caption)
        .prepend_fonts(cli.fonts.clone())
        .build()
    {
        Ok(config) => config,
        Err(e) if e.is_nothing_to_do() => return nothing_to_do(&mut console, &e),
        Err(e) => return Err(e).context("Invalid configuration"),
    };

    let scan = match inspect(&base) {
        Ok(scan) => scan,
        Err(e) if e.is_nothing_to_do() => return nothing_to_do(&mut console, &e),
        Err(e) => return Err(e).context("Failed to inspect images"),
    };

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&scan).context("Failed to serialize scan report")?
            );
        } else {
            console.show_scan(&scan).context("Failed to write to stdout")?;
            if let Some(size) = scan.suggested_size.filter(|_| scan.has_mixed_sizes()) {
                console
                    .say(&format!("\nImages have different sizes.\nSuggested standard size: {size}"))
                    .context("Failed to write to stdout")?;
            }
        }
        return Ok(());
    }

    // ── Dialogue ─────────────────────────────────────────────────────────
    let interactive = !cli.yes && !cli.json;
    if !cli.json && !cli.quiet {
        console.show_scan(&scan).context("Failed to write to stdout")?;
    }
    let choices = ask_choices(&cli, &mut console, &scan, &base, interactive).context("Failed to read answer")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .input_dir(&cli.input)
        .output_file(choices.output)
        .selection(choices.selection)
        .resize(choices.resize)
        .caption(!cli.no_caption)
        .prepend_fonts(cli.fonts.clone());
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_scanned(&scan, &config).context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        for warning in &output.stats.warnings {
            console
                .say(&format!("Warning: {warning}"))
                .context("Failed to write to stdout")?;
        }
    }
    console
        .saved(&output.document.path)
        .context("Failed to write to stdout")?;
    if !cli.quiet && !show_progress {
        eprintln!(
            "{} pages ({} resized) in {}ms",
            output.stats.pages_written, output.stats.pages_resized, output.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Resize, selection and output, each from its flag or from the user.
struct Choices {
    resize: ResizeMode,
    selection: SelectionRange,
    output: PathBuf,
}

fn ask_choices<R: BufRead, W: Write>(
    cli: &Cli,
    console: &mut Console<R, W>,
    scan: &ScanReport,
    base: &ConversionConfig,
    interactive: bool,
) -> io::Result<Choices> {
    let resize = match cli.resize {
        ResizeArg::Ask if interactive => console.ask_resize(scan)?,
        ResizeArg::Ask | ResizeArg::No => ResizeMode::Never,
        ResizeArg::Yes => ResizeMode::ToSuggested,
        ResizeArg::To(d) => ResizeMode::To(d),
    };

    let total = scan.files.len();
    let selection = match cli.pages {
        // JSON mode keeps stdout clean; the widened range is still logged.
        Some(ref pages) if cli.json => SelectionRange::parse_or_all(pages, total),
        Some(ref pages) => console.select(pages, total)?,
        None if interactive => console.ask_selection(total)?,
        None => SelectionRange::All,
    };

    let default = default_output_path(&base.input_dir);
    let output = match cli.output {
        Some(ref path) => path.clone(),
        None if interactive => console.ask_output(&default)?,
        None => default,
    };

    Ok(Choices {
        resize,
        selection,
        output,
    })
}

/// Report a missing directory or an empty one and exit normally.
fn nothing_to_do<R: BufRead, W: Write>(console: &mut Console<R, W>, err: &Img2PdfError) -> Result<()> {
    tracing::debug!("Nothing to convert: {:?}", err);
    console.say(&err.to_string()).context("Failed to write to stdout")?;
    Ok(())
}
