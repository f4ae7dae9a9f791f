use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use windy_notifier::apis::weatherlink::WeatherLinkScraper;
use windy_notifier::app::monitor::Monitor;
use windy_notifier::config::Settings;
use windy_notifier::constants::DEFAULT_DEBUG_DIR;
use windy_notifier::error::WindyError;
use windy_notifier::infra::diagnostics::FsDiagnosticSink;
use windy_notifier::notifiers::build_notifiers;
use windy_notifier::{cleanup, logging, metrics, selftest};

#[derive(Parser)]
#[command(name = "windy_notifier")]
#[command(about = "Wind speed monitor that alerts by email or Telegram")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the monitoring loop
    Run {
        /// TOML settings file (keys are the lowercase env var names)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Run a single check and exit
        #[arg(long)]
        once: bool,
    },
    /// Self-test the scraper or the notifiers against the live services
    Check {
        #[arg(value_enum)]
        target: CheckTarget,
        /// Wind speed in knots used for test notifications
        #[arg(long, default_value_t = 18.5)]
        wind_speed: f64,
        /// Gust speed in knots used for test notifications
        #[arg(long, default_value_t = 25.3)]
        wind_gust: f64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List (or delete) debug artifacts
    Clean {
        /// Delete the files instead of only listing them
        #[arg(long)]
        delete: bool,
        /// Directory to clean (defaults to DEBUG_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CheckTarget {
    Scraper,
    Email,
    Telegram,
    Notifiers,
}

fn load_settings(config: Option<&PathBuf>) -> Result<Settings, WindyError> {
    match config {
        Some(path) => {
            dotenv::dotenv().ok();
            Settings::from_toml_file(path)
        }
        None => Settings::from_env(),
    }
}

async fn run_monitor(settings: Settings, once: bool) -> anyhow::Result<()> {
    if let Some(addr) = settings.prometheus_addr {
        metrics::init_metrics(addr);
    }

    let notifiers = build_notifiers(&settings);
    if notifiers.is_empty() {
        return Err(WindyError::NoNotifiers {
            method: settings.notification_method.as_str().to_string(),
        })
        .context("no notifier is fully configured; run `windy_notifier check notifiers`");
    }

    let diagnostics = Arc::new(FsDiagnosticSink::new(&settings.debug_dir));
    let loader = WeatherLinkScraper::default_loader().context("failed to create page loader")?;
    if !loader.renders_scripts() {
        warn!(
            "Page loader '{}' does not run page scripts; the WeatherLink dashboard will \
             not render and every check will fail. Rebuild with the default `browser` feature.",
            loader.loader_name()
        );
    }
    let source = Arc::new(WeatherLinkScraper::new(loader, diagnostics.clone()));

    let monitor = Monitor::new(&settings, source, notifiers, diagnostics);
    let max_cycles = if once { Some(1) } else { None };
    monitor.run(max_cycles).await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, once } => {
            let settings = load_settings(config.as_ref()).context("failed to load settings")?;
            logging::init_logging(&settings.debug_dir);
            info!(
                "Loaded settings: threshold {} knots, method {}",
                settings.wind_threshold,
                settings.notification_method.as_str()
            );
            if let Err(e) = run_monitor(settings, once).await {
                error!("Wind monitor failed to start: {:#}", e);
                return Err(e);
            }
        }
        Commands::Check {
            target,
            wind_speed,
            wind_gust,
            config,
        } => {
            let settings = load_settings(config.as_ref()).context("failed to load settings")?;
            logging::init_logging(&settings.debug_dir);
            let gust = Some(wind_gust);
            let ok = match target {
                CheckTarget::Scraper => selftest::check_scraper(&settings).await,
                CheckTarget::Email => selftest::check_email(&settings, wind_speed, gust).await,
                CheckTarget::Telegram => {
                    selftest::check_telegram(&settings, wind_speed, gust).await
                }
                CheckTarget::Notifiers => {
                    selftest::check_notifiers(&settings, wind_speed, gust).await
                }
            };
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Clean { delete, dir } => {
            let dir = dir.unwrap_or_else(|| {
                Settings::from_env()
                    .map(|s| s.debug_dir)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_DEBUG_DIR))
            });
            let files = cleanup::list_artifacts(&dir)
                .with_context(|| format!("failed to read {}", dir.display()))?;

            if files.is_empty() {
                println!("No temporary files found to clean up.");
                return Ok(());
            }

            println!("Debug artifacts in {}:", dir.display());
            for file in &files {
                println!("  - {}", file.display());
            }

            if delete {
                let failures = cleanup::remove_artifacts(&files);
                for (path, e) in &failures {
                    println!("❌ Error deleting {}: {}", path.display(), e);
                }
                println!(
                    "✅ Cleanup completed ({} deleted)",
                    files.len() - failures.len()
                );
            } else {
                println!("\nRun again with --delete to remove them.");
            }
        }
    }
    Ok(())
}
