//! # SignBot
//!
//! Command-line entry point. Runs the contract workflow once, or as a
//! daemon at the configured daily times.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use signbot::config::ConfigManager;
use signbot::logging::init_structured_logging;
use signbot::orchestration::{ContractBot, RunOutcome};
use signbot::scheduler::DailySchedule;
use signbot::storage::{DocumentStore, LocalStorage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "signbot")]
#[command(about = "Contract signature workflow automation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Directory holding signbot.yaml and signbot.<env>.yaml
    #[arg(short, long, env = "SIGNBOT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment name (development, test, production); detected when omitted
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute one run now
    Run,

    /// Run at the configured daily times until interrupted
    Daemon,

    /// Load and validate configuration, then print it with credentials masked
    CheckConfig {
        /// Output format (json, yaml)
        #[arg(long, default_value = "yaml")]
        format: String,
    },

    /// List the contracts stored locally
    Inventory,
}

fn load_config(cli: &Cli) -> Result<Arc<ConfigManager>> {
    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_for_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    };
    manager.context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let manager = load_config(&cli)?;
    let config = manager.config();

    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::CheckConfig { format } => {
            let sanitized = manager.sanitized();
            let rendered = match format.as_str() {
                "json" => serde_json::to_string_pretty(&sanitized)?,
                "yaml" => serde_yaml::to_string(&sanitized)?,
                other => bail!("unknown output format '{other}' (expected json or yaml)"),
            };
            println!("Environment: {}", manager.environment());
            println!("Config Directory: {}", manager.config_directory().display());
            println!("{rendered}");
            println!("Configuration is valid");
        }
        Commands::Inventory => {
            let storage = LocalStorage::new(config.storage.clone());
            let new_contracts = storage.list_new_contracts().await?;
            let finalized = storage.list_finalized_contracts().await?;

            println!(
                "Novos ({}): {}",
                new_contracts.len(),
                config.storage.new_contracts_dir.display()
            );
            for name in &new_contracts {
                println!("  {name}");
            }
            println!(
                "Finalizados ({}): {}",
                finalized.len(),
                config.storage.finalized_contracts_dir.display()
            );
            for name in &finalized {
                println!("  {name}");
            }
        }
        Commands::Run => {
            let _guard = init_structured_logging(&config.storage.logs_dir, manager.environment());
            match ContractBot::from_config(config).run().await {
                RunOutcome::Completed(report) => println!(
                    "Run completed: {} new, {} finalized ({} confirmed)",
                    report.total_new,
                    report.total_finalized,
                    report.confirmed_count()
                ),
                RunOutcome::Aborted { phase, error } => {
                    println!("Run aborted during {phase}: {error}")
                }
            }
        }
        Commands::Daemon => {
            let _guard = init_structured_logging(&config.storage.logs_dir, manager.environment());
            let schedule = DailySchedule::from_config(&config.schedule)
                .context("invalid schedule configuration")?;
            info!(times = ?schedule.times(), "Daemon started");

            tokio::select! {
                () = schedule.run_forever(|| {
                    let bot = ContractBot::from_config(config);
                    async move { bot.run().await }
                }) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for shutdown signal")?;
                    info!("Shutdown requested, daemon stopping");
                }
            }
        }
    }

    Ok(())
}
