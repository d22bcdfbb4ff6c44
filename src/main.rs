//! Campaign Pulse CLI
//!
//! Terminal dashboard for the campaign API:
//! - List campaigns
//! - Show one campaign
//! - Aggregate insights
//! - Watch live metrics

use anyhow::Context;
use campaign_pulse::client::{ApiError, CampaignClient, Fetch};
use campaign_pulse::config::{generate_default_config, Config, LoggingConfig};
use campaign_pulse::format::CurrencyStyle;
use campaign_pulse::stream::{HttpTransport, InsightSource, LiveView};
use campaign_pulse::view;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "campaign-pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal dashboard for marketing campaign metrics")]
#[command(long_about = "Campaign Pulse reads campaigns and insights from the campaign API\nand follows a campaign's live metrics stream.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Campaign API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all campaigns
    List,

    /// Show one campaign
    Show {
        /// Campaign ID
        id: String,
        /// Follow the campaign's live metrics after the details
        #[arg(short, long)]
        watch: bool,
    },

    /// Show aggregate insights across all campaigns
    Insights,

    /// Follow a campaign's live metrics until Ctrl-C
    Watch {
        /// Campaign ID
        id: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let mut config = with_bootstrap_logging(bootstrap_filter(), std::io::stderr, || {
        Config::load_from(cli.config.as_deref())
    })?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(base_url = %config.api.base_url, "Campaign Pulse v{}", env!("CARGO_PKG_VERSION"));

    let client = CampaignClient::new(config.client_config())?;

    match cli.command {
        Commands::List => {
            let list = fetch("campaigns", || client.list_campaigns()).await?;
            match cli.format {
                OutputFormat::Json => print_json(&list)?,
                OutputFormat::Table => print!("{}", view::render_campaign_table(&list)),
            }
        }

        Commands::Show { id, watch } => {
            let campaign = fetch("campaign", || client.get_campaign(&id)).await?;
            match cli.format {
                OutputFormat::Json => print_json(&campaign)?,
                OutputFormat::Table => print!("{}", view::render_campaign_detail(&campaign)),
            }

            if watch {
                println!();
                watch_live(&client, &config, &id, cli.format).await?;
            }
        }

        Commands::Insights => {
            let insights = fetch("insights", || client.all_insights()).await?;
            match cli.format {
                OutputFormat::Json => print_json(&insights)?,
                OutputFormat::Table => print!("{}", view::render_insights_panel(&insights)),
            }
        }

        Commands::Watch { id } => {
            watch_live(&client, &config, &id, cli.format).await?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn bootstrap_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("campaign_pulse=warn"))
}

/// Run `load` with a temporary subscriber, so config-loading warnings are
/// reported before the configured one is installed
fn with_bootstrap_logging<W, T>(filter: EnvFilter, writer: W, load: impl FnOnce() -> T) -> T
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(subscriber, load)
}

/// Logs go to stderr so the views on stdout stay clean
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("campaign_pulse={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Run one read, offering a manual retry on failure
async fn fetch<T, F, Fut>(what: &str, request: F) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    fetch_with(what, request, confirm_retry).await
}

async fn fetch_with<T, F, Fut, R>(what: &str, request: F, mut retry: R) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    R: FnMut() -> anyhow::Result<bool>,
{
    let mut state = Fetch::load(&request).await;

    loop {
        if let Some(message) = state.error() {
            eprintln!("Error loading {}: {}", what, message);
            if !retry()? {
                anyhow::bail!("Loading {} failed; run the command again to retry", what);
            }
            state.retry(&request).await;
            continue;
        }

        if let Some(value) = state.into_loaded() {
            return Ok(value);
        }
        anyhow::bail!("Loading {} did not complete", what);
    }
}

fn confirm_retry() -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    eprint!("Retry? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Follow the live stream, redrawing on every change
async fn watch_live(
    client: &CampaignClient,
    config: &Config,
    id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let initial = match client.campaign_insights(id).await {
        Ok(insight) => Some(insight),
        Err(e) => {
            tracing::warn!(campaign_id = %id, error = %e, "No initial insight snapshot");
            None
        }
    };

    let transport = HttpTransport::new(Duration::from_secs(config.api.request_timeout_secs))
        .context("Failed to build stream transport")?;
    let source = InsightSource::new(
        config.api.base_url.clone(),
        Arc::new(transport),
        config.stream_options(),
    );

    let mut live = source.activate(id, initial);
    let currency = config.display.currency;
    draw(&live.view(), format, currency)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = live.changed() => match update {
                Some(live_view) => draw(&live_view, format, currency)?,
                None => break,
            },
        }
    }

    live.deactivate();
    Ok(())
}

fn draw(live_view: &LiveView, format: OutputFormat, currency: CurrencyStyle) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(live_view)?),
        OutputFormat::Table => {
            let mut stdout = std::io::stdout();
            if stdout.is_terminal() {
                write!(stdout, "\x1b[2J\x1b[H")?;
            }
            write!(stdout, "{}", view::render_live_card(live_view, currency))?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}
