//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use landbank_agenda::FetchOptions;
use landbank_core::pipeline::{
    PdfAgendaSource, ProgressReporter, RunConfig, RunOutcome, RunSummary, run_pipeline,
};
use landbank_discovery::ListingOptions;
use landbank_enrich::AisConfig;
use landbank_extract::{RuleBasedNormalizer, extract_candidates};
use landbank_shared::{AppConfig, cancel_pair, init_config, load_config, resolve_gatekeeper_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Landbank — Philadelphia Land Bank agenda address pipeline.
#[derive(Parser)]
#[command(
    name = "landbank",
    version,
    about = "Scrape land-bank board agendas into enriched address tables.",
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
    /// Run the full pipeline: discover, extract, enrich, write tables.
    Run {
        /// Output directory for the CSV tables (defaults to config value).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Board listing page to scrape (defaults to config value).
        #[arg(long)]
        board_url: Option<String>,

        /// Seen-URL state file (defaults to <out>/parsed_urls.json).
        #[arg(long)]
        state_file: Option<PathBuf>,
    },

    /// Extract candidate addresses from a local agenda PDF.
    Extract {
        /// Path to the agenda PDF.
        pdf: PathBuf,
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
        0 => "landbank=info",
        1 => "landbank=debug",
        _ => "landbank=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            out,
            board_url,
            state_file,
        } => cmd_run(out, board_url.as_deref(), state_file).await,
        Command::Extract { pdf } => cmd_extract(&pdf).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    out: Option<PathBuf>,
    board_url: Option<&str>,
    state_file: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let run_config = build_run_config(&config, out, board_url, state_file)?;

    info!(board_url = %run_config.board_url, "starting pipeline run");

    // Ctrl-C finishes the current lookup, writes partial tables, and
    // leaves the run state untouched.
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt received, finishing current lookup...");
            handle.cancel();
        }
    });

    let reporter = CliProgress::new();
    let source = PdfAgendaSource::new(run_config.fetch.clone());
    let normalizer = RuleBasedNormalizer::new();

    let outcome = run_pipeline(&run_config, &source, &normalizer, &reporter, token).await?;

    match outcome {
        RunOutcome::NoNewAgendas => {
            println!();
            println!("  No new agendas to parse.");
            println!();
        }
        RunOutcome::Completed(result) => {
            println!();
            if result.cancelled {
                println!("  Run interrupted — partial tables written.");
            } else {
                println!("  Agenda processed!");
            }
            println!("  Meeting:   {}", result.meeting_date);
            println!("  Agenda:    {}", result.agenda_url);
            println!(
                "  Addresses: {}/{}",
                result.addresses_enriched, result.addresses_total
            );
            println!("  Archive:   {}", result.archive_path.display());
            println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
            println!();
        }
    }

    Ok(())
}

/// Merge CLI overrides over the loaded config into a run config.
fn build_run_config(
    config: &AppConfig,
    out: Option<PathBuf>,
    board_url: Option<&str>,
    state_file: Option<PathBuf>,
) -> Result<RunConfig> {
    let board = board_url.unwrap_or(&config.agenda.board_url);
    let board_url = Url::parse(board).map_err(|e| eyre!("invalid board URL '{board}': {e}"))?;

    let output_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let state_file = state_file.unwrap_or_else(|| output_dir.join(&config.output.state_file));

    Ok(RunConfig {
        board_url,
        listing: ListingOptions {
            timeout_secs: config.agenda.timeout_secs,
            user_agent: config.agenda.user_agent.clone(),
        },
        fetch: FetchOptions {
            timeout_secs: config.agenda.timeout_secs,
            user_agent: config.agenda.user_agent.clone(),
        },
        bullet_markers: config.agenda.bullet_markers.clone(),
        ais: AisConfig {
            base_url: config.ais.base_url.clone(),
            gatekeeper_key: resolve_gatekeeper_key(config)?,
            timeout: Duration::from_secs(config.ais.timeout_secs),
            rate_limit_backoff: Duration::from_secs(config.ais.backoff_secs),
        },
        output_dir,
        state_file,
    })
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn address_lookup(&self, address: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {address}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

async fn cmd_extract(pdf: &PathBuf) -> Result<()> {
    let config = load_config()?;

    let abs = std::fs::canonicalize(pdf)
        .map_err(|e| eyre!("cannot read '{}': {e}", pdf.display()))?;
    let url = Url::from_file_path(&abs)
        .map_err(|_| eyre!("cannot build file URL for '{}'", abs.display()))?;

    let bytes = std::fs::read(&abs)
        .map_err(|e| eyre!("cannot read '{}': {e}", abs.display()))?;
    let agenda = landbank_agenda::extract_from_bytes(url, &bytes)?;

    match landbank_agenda::extract_meeting_date(&agenda.text) {
        Ok(date) => println!("Meeting date: {date}"),
        Err(_) => println!("Meeting date: (not found)"),
    }

    let candidates = extract_candidates(&agenda.text, &config.agenda.bullet_markers);
    println!("Candidate addresses ({}):", candidates.len());
    for candidate in &candidates {
        println!("  {candidate}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
