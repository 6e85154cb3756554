//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use recap_shared::{
    AppConfig, FailurePolicy, TimeWindow, init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// recap — turn a month of personal activity into a newsletter section.
#[derive(Parser)]
#[command(
    name = "recap",
    version,
    about = "Aggregate films, books, essays, writing, and input stats into a monthly Markdown digest.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (defaults to ~/.recap/recap.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands. Bare `recap` runs a digest.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build this month's digest and print it to stdout.
    Run {
        /// Month to cover as YYYY-MM (defaults to the current month).
        #[arg(long)]
        month: Option<String>,

        /// Drop failed sections instead of printing their failure sentence.
        #[arg(long)]
        drop_failed: bool,
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
        0 => "recap=info",
        1 => "recap=debug",
        _ => "recap=trace",
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

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command.unwrap_or(Command::Run {
        month: None,
        drop_failed: false,
    }) {
        Command::Run { month, drop_failed } => {
            let config = load(&config_path)?;
            cmd_run(&config, month.as_deref(), drop_failed).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => {
                let config = load(&config_path)?;
                cmd_config_show(&config).await
            }
        },
    }
}

fn load(path: &Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Parse a `YYYY-MM` month override.
fn parse_month(value: &str) -> Result<TimeWindow> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| eyre!("invalid month '{value}': expected YYYY-MM"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| eyre!("invalid month '{value}': bad year"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| eyre!("invalid month '{value}': bad month"))?;
    if !(1..=12).contains(&month) {
        return Err(eyre!("invalid month '{value}': month must be 01-12"));
    }
    Ok(TimeWindow::new(year, month))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: &AppConfig, month: Option<&str>, drop_failed: bool) -> Result<()> {
    let window = match month {
        Some(value) => parse_month(value)?,
        None => TimeWindow::current(),
    };
    let policy = if drop_failed {
        FailurePolicy::Drop
    } else {
        config.output.on_failure
    };

    info!(window = %window, ?policy, "building digest");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!("Collecting {window} sections"));

    let digest = recap_digest::run(config, window, policy).await?;
    spinner.finish_and_clear();

    // The digest is the only stdout output; logs go to stderr.
    println!("{digest}");

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
