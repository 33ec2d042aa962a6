//! Top-level CLI definition and dispatch.

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::json;
use thiserror::Error;

use routeros_queue_monitor::core::config::Config;
use routeros_queue_monitor::core::errors::QmError;
use routeros_queue_monitor::core::logging::{self, LogSink, Verbosity};
use routeros_queue_monitor::queue::export::ExportDocument;
use routeros_queue_monitor::queue::types::{Queue, QueueSnapshot};
use routeros_queue_monitor::queue::units::{format_bytes, format_rate, format_utilization};
use routeros_queue_monitor::queue::view::{Filter, SortKey, Status, project};
use routeros_queue_monitor::stream::endpoints::Endpoints;
use routeros_queue_monitor::stream::snapshot::SnapshotLoader;
use routeros_queue_monitor::tui::run_dashboard;
use routeros_queue_monitor::tui::theme::ColorMode;

/// RouterOS Queue Monitor: live queue-tree utilization in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "rqm",
    author,
    version,
    about = "RouterOS Queue Monitor - live queue utilization dashboard",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Monitoring service base URL (overrides config and environment).
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute (defaults to `dashboard`).
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Live full-screen dashboard.
    Dashboard,
    /// Fetch one snapshot and print the projected queue table.
    Snapshot(SnapshotArgs),
    /// Fetch one snapshot and write an export document.
    Export(ExportArgs),
    /// Show effective configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct SnapshotArgs {
    /// Queue filter: all, upload, download, high.
    #[arg(long, default_value = "all", value_name = "FILTER")]
    filter: String,
    /// Sort key: name, utilization, rate.
    #[arg(long, default_value = "name", value_name = "KEY")]
    sort: String,
    /// Case-insensitive name substring.
    #[arg(long, default_value = "", value_name = "TEXT")]
    search: String,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct ExportArgs {
    /// Directory for the export file (defaults to `export.directory`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration as TOML.
    Show,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Service, network, or environment failure.
    #[error("{0}")]
    Runtime(String),
    /// Dashboard could not start or lost the terminal.
    #[error(transparent)]
    Startup(QmError),
    /// Failure reported by the library.
    #[error(transparent)]
    Monitor(#[from] QmError),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) | Self::Startup(_) => 1,
            Self::Monitor(error) if !error.is_retryable() => 1,
            Self::Runtime(_) | Self::Monitor(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let color = ColorMode::from_environment(cli.no_color);
    if matches!(color, ColorMode::Disabled) {
        control::set_override(false);
    }

    let command = cli.command.clone().unwrap_or(Command::Dashboard);
    if let Command::Completions(args) = &command {
        let mut cmd = Cli::command();
        let binary_name = cmd.get_name().to_string();
        generate(args.shell, &mut cmd, binary_name, &mut io::stdout());
        return Ok(());
    }

    let config = load_config(cli)?;
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let sink = match command {
        Command::Dashboard => LogSink::File(&config.paths.log_file),
        _ => LogSink::Stderr {
            no_color: matches!(color, ColorMode::Disabled),
        },
    };
    logging::init(verbosity, sink).map_err(CliError::Startup)?;

    match command {
        Command::Dashboard => run_dashboard(&config, color).map_err(CliError::Startup),
        Command::Snapshot(args) => run_snapshot(&config, &args),
        Command::Export(args) => run_export(&config, &args),
        Command::Config(args) => run_config(&config, &args),
        Command::Completions(_) => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref()).map_err(|error| match error {
        QmError::InvalidConfig { .. }
        | QmError::MissingConfig { .. }
        | QmError::ConfigParse { .. } => CliError::User(error.to_string()),
        other => CliError::Monitor(other),
    })?;
    if let Some(server) = &cli.server {
        config
            .override_server(server)
            .map_err(|error| CliError::User(error.to_string()))?;
    }
    Ok(config)
}

fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| CliError::Runtime(format!("failed to start runtime: {error}")))?;
    Ok(runtime.block_on(future))
}

fn fetch_snapshot(config: &Config) -> Result<QueueSnapshot, CliError> {
    let endpoints = Endpoints::from_base_url(&config.server.base_url)?;
    let loader = SnapshotLoader::new(endpoints.snapshot_url, config.server.request_timeout())?;
    let loaded = block_on(loader.load())??;
    loaded.ok_or_else(|| {
        CliError::Runtime(format!("{} returned no queue collection", loader.url()))
    })
}

// ──────────────────── snapshot ────────────────────

fn run_snapshot(config: &Config, args: &SnapshotArgs) -> Result<(), CliError> {
    let snapshot = fetch_snapshot(config)?;
    let visible = project(
        &snapshot.queues,
        Filter::from_label(&args.filter),
        &args.search,
        SortKey::from_label(&args.sort),
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        let payload = json!({
            "queues": visible,
            "system_stats": snapshot.system_stats,
        });
        serde_json::to_writer_pretty(&mut stdout, &payload)?;
        writeln!(stdout)?;
        return Ok(());
    }

    write_table(&mut stdout, &visible)?;
    let stats = &snapshot.system_stats;
    writeln!(
        stdout,
        "\n{} {}   {} {}   {} {}   {} {}",
        "Queues".dimmed(),
        stats.total_queues,
        "Upload".dimmed(),
        or_zero_rate(&stats.total_upload),
        "Download".dimmed(),
        or_zero_rate(&stats.total_download),
        "High utilization".dimmed(),
        stats.high_utilization
    )?;
    Ok(())
}

fn or_zero_rate(value: &str) -> &str {
    if value.is_empty() { "0 Mbps" } else { value }
}

fn write_table<W: Write>(out: &mut W, queues: &[Queue]) -> io::Result<()> {
    if queues.is_empty() {
        return writeln!(out, "{}", "No matching queues".dimmed());
    }
    writeln!(
        out,
        "{}",
        format!(
            "{:<24} {:>14} {:>14} {:>11} {:>8}  {}",
            "NAME", "RATE", "MAX LIMIT", "BYTES", "UTIL", "STATUS"
        )
        .bold()
    )?;
    for q in queues {
        let status = Status::from_utilization(q.utilization);
        let label = match status {
            Status::Normal => status.label().green(),
            Status::Warning => status.label().yellow(),
            Status::Critical => status.label().red().bold(),
        };
        writeln!(
            out,
            "{:<24} {:>14} {:>14} {:>11} {:>8}  {label}",
            q.name,
            format_rate(&q.rate),
            format_rate(&q.max_limit),
            format_bytes(q.bytes),
            format_utilization(q.utilization),
        )?;
    }
    Ok(())
}

// ──────────────────── export ────────────────────

fn run_export(config: &Config, args: &ExportArgs) -> Result<(), CliError> {
    let snapshot = fetch_snapshot(config)?;
    let document = ExportDocument::build(&snapshot.queues, &snapshot.system_stats, Local::now())
        .map_err(|error| match error {
            QmError::NothingToExport => CliError::User("No data to export".to_string()),
            other => CliError::Monitor(other),
        })?;
    let dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.export.directory.clone());
    let path = document.write_to(&dir)?;
    tracing::info!(path = %path.display(), queues = snapshot.queues.len(), "export written");
    println!("{} {}", "Exported".green().bold(), path.display());
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(config: &Config, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Path => println!("{}", config.paths.config_file.display()),
        ConfigCommand::Show => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|error| CliError::Runtime(format!("failed to render config: {error}")))?;
            print!("{rendered}");
        }
    }
    Ok(())
}
