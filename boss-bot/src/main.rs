//! Terminal host for the group boss battle plugin.
//!
//! Stands in for a chat framework: every stdin line is a group message.
//!
//! ```bash
//! cargo run -p boss-bot -- --cooldown 5
//! ```

mod host;

use anyhow::Context;
use boss_core::{AnthropicGenerator, Dispatcher, GameConfig, NarrativeConfig, Narrator, Plugin};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "boss-bot", version, about = "Fight LLM-voiced bosses from your terminal")]
struct Args {
    /// JSON file with `bosses` and `personalities` to replace the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Message that summons a boss
    #[arg(long)]
    summon_command: Option<String>,

    /// Message that attacks the group's boss
    #[arg(long)]
    attack_command: Option<String>,

    /// Seconds a player must wait between attacks
    #[arg(long)]
    cooldown: Option<u64>,

    /// Model used for boss dialogue
    #[arg(long)]
    model: Option<String>,

    /// Never call the language model; bosses use their fallback lines
    #[arg(long)]
    offline: bool,

    /// Seed for boss selection
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = GameConfig::from_env().context("invalid game configuration")?;
    if let Some(path) = &args.catalog {
        config = config.with_catalog_file(path)?;
    }
    if let Some(command) = args.summon_command {
        config = config.with_summon_command(command);
    }
    if let Some(command) = args.attack_command {
        config = config.with_attack_command(command);
    }
    if let Some(secs) = args.cooldown {
        config = config.with_cooldown(Duration::from_secs(secs));
    }

    let mut narrative = NarrativeConfig::from_env().context("invalid narrative configuration")?;
    if let Some(model) = args.model {
        narrative = narrative.with_model(model);
    }

    let narrator = if args.offline {
        Narrator::offline()
    } else {
        match AnthropicGenerator::from_env(&narrative) {
            Ok(generator) => {
                tracing::info!(model = generator.model(), "boss dialogue enabled");
                Narrator::new(Arc::new(generator))
            }
            Err(e) => {
                tracing::warn!(error = %e, "ANTHROPIC_API_KEY not set - bosses will use fallback lines");
                Narrator::offline()
            }
        }
    };

    let mut dispatcher = Dispatcher::new(config, narrator).context("failed to start the game")?;
    if let Some(seed) = args.seed {
        dispatcher = dispatcher.with_seed(seed);
    }
    dispatcher.initialize().await;

    host::run(&dispatcher).await?;
    Ok(())
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
