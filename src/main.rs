use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use teams_notifier::delivery::{Deliver, DeliveryError, DeliveryOutcome};
use teams_notifier::{hooks, Dispatcher, NotificationDocument, NotifierConfig, WebhookTarget};

#[derive(Parser)]
#[command(name = "teams-notifier")]
#[command(version)]
#[command(about = "Send test-run lifecycle events to a chat webhook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON Lines event file through the notifier
    Replay {
        /// Path to the events file (one JSON event per line)
        events: PathBuf,

        /// Notifier config (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Webhook URL, overrides the config file
        #[arg(short, long)]
        webhook: Option<String>,

        /// Print cards instead of posting them
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Print the effective configuration
    CheckConfig {
        /// Notifier config (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Prints cards to stdout instead of posting them.
struct PrintCards;

impl Deliver for PrintCards {
    fn deliver(
        &self,
        target: &WebhookTarget,
        document: Option<&NotificationDocument>,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let Some(document) = document else {
            return Ok(DeliveryOutcome::Skipped);
        };

        let destination = if target.is_enabled() {
            target.url.as_str()
        } else {
            "<no webhook>"
        };
        println!(
            "\n{} {} -> {}",
            "✉".blue().bold(),
            document.summary.white().bold(),
            destination.dimmed()
        );
        println!("{}", document.to_json_pretty()?);
        Ok(DeliveryOutcome::Delivered)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NotifierConfig> {
    match path {
        Some(path) => NotifierConfig::from_file(path),
        None => Ok(NotifierConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            events,
            config,
            webhook,
            dry_run,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(url) = webhook {
                config.webhook = url;
            }

            let file = File::open(&events)
                .with_context(|| format!("Failed to open {}", events.display()))?;
            let reader = BufReader::new(file);

            println!(
                "{} Replaying events from: {}",
                "▶".green().bold(),
                events.display()
            );
            if !config.target().is_enabled() && !dry_run {
                println!("  {}", "No webhook configured, cards will not be sent".yellow());
            }
            if !config.verify_tls {
                log::debug!("TLS certificate verification is disabled");
            }

            let summary = if dry_run {
                let mut dispatcher =
                    Dispatcher::new(config.target(), config.builder_options(), PrintCards);
                hooks::replay_events(reader, &mut dispatcher)?
            } else {
                let mut dispatcher = Dispatcher::from_config(&config)?;
                hooks::replay_events(reader, &mut dispatcher)?
            };

            println!(
                "\n{} {} events, {} cards, {} rejected",
                "■".blue().bold(),
                summary.events,
                summary.documents.to_string().green(),
                summary.rejected.to_string().red()
            );
        }

        Commands::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            let mut shown = config.clone();
            if shown.credential.is_some() {
                shown.credential = Some("<redacted>".to_string());
            }
            print!("{}", serde_yaml::to_string(&shown)?);
            if !config.verify_tls {
                println!(
                    "{} TLS certificate verification is disabled",
                    "⚠".yellow()
                );
            }
        }
    }

    Ok(())
}
