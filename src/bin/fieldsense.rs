//! CLI binary for fieldsense.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! runs one upload through a `Session` and prints the result table.

use anyhow::{Context, Result};
use clap::Parser;
use fieldsense::session::{NEW_DOCUMENT_LABEL, RETRY_LABEL};
use fieldsense::{
    copy_to_clipboard, export_json, landing, ClientConfig, ExtractionReport, FieldCatalog,
    InferenceClient, NoopProgressCallback, ProgressCallback, ProgressCallbackRef, ProgressScript,
    ProgressStage, ProcessingDetails, Resolution, Session, SystemClipboard, UploadFile, UploadState,
    DEFAULT_EXPORT_FILENAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Percentage bar driven by the scripted progress sequence.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Processing");
        bar.set_message("Uploading…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for CliProgressCallback {
    fn on_stage(&self, _index: usize, stage: &ProgressStage) {
        self.bar.set_message(format!("{}…", stage.name));
    }

    fn on_tick(&self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn on_done(&self) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract fields from a photo of a service log
  fieldsense service-log.jpg

  # Use a remote inference service
  fieldsense --endpoint http://10.0.0.7:8000 service-log.jpg

  # Save the results as JSON (default name: field-service-extraction-results.json)
  fieldsense --export service-log.jpg
  fieldsense --export=results/branch-0412.json service-log.jpg

  # Copy "Label: value" lines to the clipboard
  fieldsense --copy service-log.jpg

  # Machine-readable output
  fieldsense --json --no-progress service-log.jpg > out.json

  # Product overview
  fieldsense --about

KNOWN FIELDS:
  Id                Label
  ───────────────   ───────────────
  model             ATM Model
  branch_code       Branch Code
  bank              Bank Name
  city              City
  address           Address
  technician_name   Technician Name
  (other)           shown as-is

CONFIDENCE BADGES:
  high    > 80%
  medium  > 60%
  low     ≤ 60%

ENVIRONMENT VARIABLES:
  FIELDSENSE_ENDPOINT         Base URL of the inference service
  FIELDSENSE_TIMEOUT          Request timeout in seconds
  FIELDSENSE_CONNECT_TIMEOUT  Connect timeout in seconds
  FIELDSENSE_MAX_RETRIES      Retries on network failure (0 or 1)
  RUST_LOG                    Override the log filter

SERVICE CONTRACT:
  POST <endpoint>/analyze, multipart field "file"
  200 → {"results":[{"class_id","bbox":[x1,y1,x2,y2],"confidence","text"}]}
"#;

/// Extract structured fields from field-service log images.
#[derive(Parser, Debug)]
#[command(
    name = "fieldsense",
    version,
    about = "Extract structured fields from field-service log images",
    long_about = "Upload a photo of a handwritten field-service log to a YOLO + OCR inference \
service and print the extracted fields (ATM model, branch code, bank, city, address, \
technician) with confidence scores.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file (JPG, PNG, …) of the service log.
    #[arg(required_unless_present = "about")]
    input: Option<PathBuf>,

    /// Base URL of the inference service; `/analyze` is appended.
    #[arg(long, env = "FIELDSENSE_ENDPOINT", default_value = fieldsense::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Declared content type, overriding the guess from the file extension.
    #[arg(long, env = "FIELDSENSE_CONTENT_TYPE")]
    content_type: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "FIELDSENSE_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Connect timeout in seconds.
    #[arg(long, env = "FIELDSENSE_CONNECT_TIMEOUT", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout: u64,

    /// Retries on network failure (0–1). HTTP errors are never retried.
    #[arg(long, env = "FIELDSENSE_MAX_RETRIES", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(0..=1))]
    max_retries: u32,

    /// Write the results as pretty JSON (`--export` or `--export=PATH`).
    #[arg(long, env = "FIELDSENSE_EXPORT", value_name = "PATH",
          num_args = 0..=1, require_equals = true,
          default_missing_value = DEFAULT_EXPORT_FILENAME)]
    export: Option<PathBuf>,

    /// Copy "Label: value" lines to the system clipboard.
    #[arg(long, env = "FIELDSENSE_COPY")]
    copy: bool,

    /// Print the extraction as JSON instead of a table.
    #[arg(long, env = "FIELDSENSE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "FIELDSENSE_NO_PROGRESS")]
    no_progress: bool,

    /// Print the product overview and exit.
    #[arg(long)]
    about: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FIELDSENSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "FIELDSENSE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.about {
        print!("{}", landing::render_about());
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An image path is required")?;

    // ── Build client ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let client = InferenceClient::new(&config).context("Failed to create HTTP client")?;

    let mut file = UploadFile::from_path(&input)
        .await
        .context("Failed to read image")?;
    if let Some(ref ct) = cli.content_type {
        file = file.with_content_type(ct.clone());
    }

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("Uploading {}", file.file_name)),
            dim(&format!("{:.2} MiB → {}", file.size_mib(), client.url())),
        );
    }

    // ── Run the upload ───────────────────────────────────────────────────
    let session = Session::new();
    let bar = show_progress.then(CliProgressCallback::new);
    let callback: ProgressCallbackRef = match bar {
        Some(ref cb) => cb.clone() as ProgressCallbackRef,
        None => Arc::new(NoopProgressCallback),
    };

    let outcome = session
        .upload(&client, file, &ProgressScript::default(), callback)
        .await;
    if let Some(ref cb) = bar {
        cb.clear();
    }
    let resolution = outcome.context("Upload rejected")?;

    if !cli.quiet {
        if let Some((w, h)) = session.preview().and_then(|p| p.dimensions) {
            eprintln!("   {}", dim(&format!("image {w}×{h}")));
        }
    }

    let extraction = match resolution {
        Resolution::Applied(UploadState::Completed(extraction)) => extraction,
        Resolution::Applied(UploadState::Failed(message)) => {
            eprintln!("{} {}", red("✘"), red(&message));
            if !cli.quiet {
                eprintln!("   {}", dim(&format!("{RETRY_LABEL}: run the command again")));
            }
            anyhow::bail!("Processing failed");
        }
        other => anyhow::bail!("Unexpected session outcome: {other:?}"),
    };

    // ── Output ───────────────────────────────────────────────────────────
    let catalog = FieldCatalog::field_service();
    if cli.json {
        let json =
            serde_json::to_string_pretty(&extraction).context("Failed to serialise results")?;
        println!("{json}");
    } else {
        let report = ExtractionReport::new(&extraction.document, catalog);
        print!("{}", report.render_table());
        if !cli.quiet {
            println!();
            print!("{}", ProcessingDetails::new(client.url()).render());
        }
    }

    if !cli.quiet {
        for rejected in &extraction.rejected {
            eprintln!("  {} {}", cyan("⚠"), dim(&rejected.to_string()));
        }
    }

    if cli.copy {
        if copy_to_clipboard(&SystemClipboard, &extraction.document, catalog) {
            if !cli.quiet {
                eprintln!("{} Copied to clipboard", green("✔"));
            }
        } else {
            eprintln!(
                "{} {}",
                red("✘"),
                red("Clipboard copy failed (is pbcopy, clip, wl-copy or xclip available?)")
            );
        }
    }

    if let Some(ref path) = cli.export {
        export_json(&extraction.document, path)
            .await
            .context("Export failed")?;
        if !cli.quiet {
            eprintln!(
                "{} Exported  →  {}",
                green("✔"),
                bold(&path.display().to_string())
            );
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {} fields extracted{}",
            green("✔"),
            extraction.document.results.len(),
            dim(&format!("  ·  {NEW_DOCUMENT_LABEL}: fieldsense <image>")),
        );
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    ClientConfig::builder()
        .endpoint(cli.endpoint.clone())
        .request_timeout_secs(cli.timeout)
        .connect_timeout_secs(cli.connect_timeout)
        .max_retries(cli.max_retries)
        .build()
        .context("Invalid configuration")
}
