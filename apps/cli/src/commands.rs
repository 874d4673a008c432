//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docsplit_core::exporter::{DownloadSink, Exporter, Notifier, TriggerOutcome};
use docsplit_core::pipeline::{
    ExportJob, ExportManifest, ExportOptions, PlannedSection, ProgressReporter, plan,
};
use docsplit_core::renderer::DocumentRenderer;
use docsplit_markdown::{RenderFormat, RenderOptions};
use docsplit_shared::{AppConfig, DocsplitError, HeadingLevel, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsplit: turn one long markdown document into an outline-shaped archive.
#[derive(Parser)]
#[command(
    name = "docsplit",
    version,
    about = "Split a markdown document at its headings and export every section as a styled document inside one zip archive.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Export a markdown document as a zip archive of section documents.
    Export {
        /// Markdown file to split, or `-` for stdin.
        input: String,

        /// Phase or document name used for the archive file name.
        #[arg(short, long, default_value = "")]
        label: String,

        /// Directory the archive is saved into (defaults to the current directory).
        #[arg(short, long)]
        out: Option<String>,

        /// Section document format: docx or html (defaults to config).
        #[arg(short, long)]
        format: Option<String>,

        /// Also write `<archive>.manifest.json` next to the archive.
        #[arg(long)]
        manifest: bool,
    },

    /// Show where every section would be placed, without rendering.
    Outline {
        /// Markdown file to inspect, or `-` for stdin.
        input: String,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,

        /// Extension to show on file entries: docx or html (defaults to config).
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docsplit=info",
        1 => "docsplit=debug",
        _ => "docsplit=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// How an export run ended once the notifier has reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportStatus {
    Completed,
    /// Already shown to the user by the notifier.
    Failed,
}

impl From<ExportStatus> for ExitCode {
    fn from(status: ExportStatus) -> Self {
        match status {
            ExportStatus::Completed => ExitCode::SUCCESS,
            ExportStatus::Failed => ExitCode::FAILURE,
        }
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let status = match cli.command {
        Command::Export {
            input,
            label,
            out,
            format,
            manifest,
        } => cmd_export(&input, &label, out.as_deref(), format.as_deref(), manifest).await?,
        Command::Outline {
            input,
            json,
            format,
        } => {
            cmd_outline(&input, json, format.as_deref())?;
            ExportStatus::Completed
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show()?,
            }
            ExportStatus::Completed
        }
    };
    Ok(status.into())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_export(
    input: &str,
    label: &str,
    out: Option<&str>,
    format: Option<&str>,
    write_manifest: bool,
) -> Result<ExportStatus> {
    let config = load_config()?;
    let render_options = resolve_render_options(&config, format)?;
    let markdown = read_input(input)?;

    let out_dir = match out {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    info!(
        input,
        label,
        format = %render_options.format,
        out = %out_dir.display(),
        "exporting document"
    );

    let exporter = Exporter::new(
        DocumentRenderer::new(render_options),
        ExportOptions::from(&config),
        Arc::new(DirectorySink::new(out_dir.clone())) as Arc<dyn DownloadSink>,
        Arc::new(TerminalNotifier) as Arc<dyn Notifier>,
    );

    let reporter = CliProgress::new();
    let outcome = exporter
        .trigger(ExportJob::new(markdown, label), &reporter)
        .await;
    reporter.finish();

    conclude_export(outcome, &out_dir, write_manifest)
}

/// Map a trigger outcome to the command result. Failures were already
/// reported by the notifier and are not returned as errors.
fn conclude_export(
    outcome: TriggerOutcome,
    out_dir: &Path,
    write_manifest: bool,
) -> Result<ExportStatus> {
    match outcome {
        TriggerOutcome::Exported(manifest) => {
            if write_manifest {
                let path = write_manifest_file(out_dir, &manifest)?;
                println!("  Manifest: {}", path.display());
            }
            Ok(ExportStatus::Completed)
        }
        TriggerOutcome::Failed(_) => Ok(ExportStatus::Failed),
        TriggerOutcome::Busy => Err(eyre!("an export is already in progress")),
    }
}

fn cmd_outline(input: &str, json: bool, format: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let render_options = resolve_render_options(&config, format)?;
    let markdown = read_input(input)?;

    let planned = plan(
        &markdown,
        render_options.format.extension(),
        &ExportOptions::from(&config),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else if planned.is_empty() {
        println!("(document has no sections)");
    } else {
        for line in outline_lines(&planned) {
            println!("{line}");
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Config file format, overridden by the `--format` flag when given.
fn resolve_render_options(config: &AppConfig, format: Option<&str>) -> Result<RenderOptions> {
    let mut options = RenderOptions::from_config(config)?;
    if let Some(format) = format {
        options.format = format.parse::<RenderFormat>()?;
    }
    Ok(options)
}

/// Read the whole document from a file, or from stdin for `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| DocsplitError::io("<stdin>", e))?;
        return Ok(buf);
    }

    let path = Path::new(input);
    Ok(std::fs::read_to_string(path).map_err(|e| DocsplitError::io(path, e))?)
}

/// Write the manifest as `<archive>.manifest.json` inside `dir`.
fn write_manifest_file(dir: &Path, manifest: &ExportManifest) -> Result<PathBuf> {
    let path = dir.join(format!("{}.manifest.json", manifest.archive_file_name));
    let content = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, content).map_err(|e| DocsplitError::io(&path, e))?;
    Ok(path)
}

/// Human-readable outline, one line per section.
fn outline_lines(planned: &[PlannedSection]) -> Vec<String> {
    planned
        .iter()
        .map(|section| {
            let label = if section.level == HeadingLevel::None {
                "(no heading)"
            } else {
                section.label.as_str()
            };
            format!("{:<3} {label:<32} -> {}", section.level.to_string(), section.path)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Host collaborators
// ---------------------------------------------------------------------------

/// Saves archives into a directory on disk.
struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, file_name: &str, archive: &[u8]) -> docsplit_shared::Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| DocsplitError::io(&self.dir, e))?;

        let target = self.dir.join(file_name);
        let temp = self.dir.join(format!(".{file_name}.tmp"));

        // Write to temp file first, then rename into place.
        std::fs::write(&temp, archive).map_err(|e| DocsplitError::io(&temp, e))?;
        if let Err(e) = std::fs::rename(&temp, &target) {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %cleanup, "failed to remove temp archive");
            }
            return Err(DocsplitError::io(&target, e));
        }

        info!(path = %target.display(), "archive saved");
        Ok(())
    }
}

/// Prints export results to the terminal.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, manifest: &ExportManifest) {
        println!();
        println!("  Export complete!");
        println!("  Archive:  {}", manifest.archive_file_name);
        println!("  Sections: {}", manifest.section_count);
        println!("  Files:    {}", manifest.entries.len());
        if manifest.section_count == 0 {
            println!("  (document had no content; the archive is empty)");
        }
        println!();
    }

    fn failure(&self, message: &str) {
        eprintln!();
        eprintln!("  {message}");
        eprintln!();
    }
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn section_rendered(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {path}"));
    }

    fn done(&self, _manifest: &ExportManifest) {
        self.spinner.finish_and_clear();
    }
}
