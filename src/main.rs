mod api;
mod gateway;

use clap::{Parser, Subcommand};
use gateway::{Gateway, SubstringMatcher};
use pacto_channels::TwilioChannel;
use pacto_core::{config, traits::Oracle};
use pacto_oracle::{Extractor, GeminiOracle};
use pacto_store::Store;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pacto", version, about = "Pacto — WhatsApp accountability agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent: webhook server plus scheduled jobs.
    Start,
    /// Check configuration and oracle availability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            let api_key = cfg.oracle.resolved_api_key();
            if api_key.is_empty() {
                anyhow::bail!(
                    "no Gemini API key. Set [oracle].api_key in config.toml \
                     or the GEMINI_API_KEY env var."
                );
            }
            let oracle = Arc::new(GeminiOracle::from_config(api_key, cfg.oracle.model.clone()));
            if !oracle.is_available().await {
                anyhow::bail!("oracle '{}' is not available", oracle.name());
            }

            let twilio_cfg = cfg.channel.twilio.clone().unwrap_or_default();
            let channel = Arc::new(TwilioChannel::from_config(&twilio_cfg));
            if !channel.is_configured() {
                anyhow::bail!(
                    "Twilio is not configured. Set [channel.twilio] account_sid, \
                     auth_token, and from_number (or the TWILIO_* env vars)."
                );
            }

            let store = Store::new(&cfg.store).await?;

            println!("Pacto — starting agent...");
            let gateway = Arc::new(Gateway::new(
                store,
                Extractor::new(oracle),
                channel,
                Box::new(SubstringMatcher),
                gateway::zone_offset(cfg.scheduler.utc_offset_hours),
            ));

            if cfg.scheduler.enabled {
                tokio::spawn(gateway::scheduler_loop(
                    gateway.clone(),
                    cfg.scheduler.clone(),
                ));
            }

            api::serve(&cfg.server, gateway).await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Pacto — Status Check\n");
            println!("Config: {}", cli.config);
            println!();

            let api_key = cfg.oracle.resolved_api_key();
            if api_key.is_empty() {
                println!("  oracle: missing API key");
            } else {
                let oracle = GeminiOracle::from_config(api_key, cfg.oracle.model.clone());
                println!(
                    "  oracle ({}): {}",
                    cfg.oracle.model,
                    if oracle.is_available().await {
                        "available"
                    } else {
                        "not reachable"
                    }
                );
            }

            match cfg.channel.twilio {
                Some(ref twilio) => {
                    let channel = TwilioChannel::from_config(twilio);
                    println!(
                        "  twilio: {}",
                        if channel.is_configured() {
                            "configured"
                        } else {
                            "missing credentials"
                        }
                    );
                }
                None => println!("  twilio: not configured"),
            }

            println!("  store: {}", cfg.store.db_path);
            println!(
                "  scheduler: daily {:02}:{:02}, monthly {:02}:{:02} on the last day (UTC{:+})",
                cfg.scheduler.daily_hour,
                cfg.scheduler.daily_minute,
                cfg.scheduler.monthly_hour,
                cfg.scheduler.monthly_minute,
                cfg.scheduler.utc_offset_hours
            );
        }
    }

    Ok(())
}
