mod history;
mod trends;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendix_backend::TrendixClient;
use trendix_core::{AppConfig, Metric};

#[derive(Debug, Parser)]
#[command(name = "trendix-cli")]
#[command(about = "Trendix trending-video command line interface")]
struct Cli {
    /// Backend API base URL
    #[arg(long, env = "TRENDIX_API_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show trending videos ranked by surge score
    Trends {
        #[arg(long, default_value = "youtube")]
        platform: String,
        /// Number of videos (clamped to 1..=50)
        #[arg(long)]
        limit: Option<String>,
        /// Look-back window in days (clamped to 1..=30)
        #[arg(long)]
        days: Option<String>,
        /// Velocity window: 3, anything else means 1
        #[arg(long)]
        velocity_days: Option<String>,
    },
    /// Chart the view or like history of one video
    History {
        video_id: String,
        #[arg(long, default_value = "views")]
        metric: Metric,
        #[arg(long, default_value = "youtube")]
        platform: String,
    },
    /// Compare two videos by their recent history
    Compare {
        video_a: String,
        video_b: String,
        #[arg(long, default_value = "youtube")]
        platform: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `--help` must not depend on a valid environment.
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = trendix_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = build_client(&config, cli.base_url.as_deref())?;

    match cli.command {
        Commands::Trends {
            platform,
            limit,
            days,
            velocity_days,
        } => {
            let query = trendix_core::TrendQuery {
                platform: Some(platform),
                limit,
                days,
                velocity_days,
            };
            trends::run_trends(&client, &config, &query).await
        }
        Commands::History {
            video_id,
            metric,
            platform,
        } => history::run_history(&client, &config, &video_id, metric, &platform).await,
        Commands::Compare {
            video_a,
            video_b,
            platform,
        } => history::run_compare(&client, &config, &video_a, &video_b, &platform).await,
    }
}

/// The `--base-url` flag wins over the config file value.
fn build_client(config: &AppConfig, base_url: Option<&str>) -> anyhow::Result<TrendixClient> {
    let base_url = base_url
        .or(config.api_base_url.as_deref())
        .ok_or_else(|| anyhow::anyhow!("TRENDIX_API_BASE_URL is not set; pass --base-url"))?;

    TrendixClient::new(base_url, config.backend_timeout_secs, &config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))
}
