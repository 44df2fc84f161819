use clap::Parser;

use callswarm::cli::{self, Cli, Commands};
use callswarm::config::AppConfig;
use callswarm::error::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;
    init_logging(&cfg.logging.level);

    match &cli.command {
        Commands::Run {
            service_type,
            max_providers,
            weights,
        } => {
            cli::run_race(
                &cfg,
                service_type.as_deref(),
                *max_providers,
                weights.as_deref(),
            )
            .await?;
        }
        Commands::Score {
            slot,
            rating,
            distance,
        } => {
            cli::score_result(slot, *rating, *distance)?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
