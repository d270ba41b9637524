//! Aurora CLI - Cart signal and abandonment tooling.
//!
//! # Usage
//!
//! ```bash
//! # How far is a cart from free shipping?
//! aurora shipping --total 150.00
//!
//! # Replay a cart session through the abandonment scheduler, 60x faster
//! aurora replay session.json --speedup 60
//!
//! # Same, but only log the notifications
//! aurora replay session.json --speedup 60 --dry-run
//! ```
//!
//! # Commands
//!
//! - `shipping` - Print free-shipping progress for a cart total
//! - `replay` - Drive a scripted cart session and dispatch reminders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use aurora_storefront::config::StorefrontConfig;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "aurora")]
#[command(author, version, about = "Aurora storefront cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print free-shipping progress for a cart total
    Shipping {
        /// Cart total, e.g. 150.00
        #[arg(short, long)]
        total: Decimal,

        /// Free-shipping threshold (defaults to `STOREFRONT_FREE_SHIPPING_THRESHOLD`)
        #[arg(long)]
        threshold: Option<Decimal>,
    },
    /// Replay a JSON cart session script
    Replay {
        /// Path to the script
        script: PathBuf,

        /// Divide every delay and wait by this factor
        #[arg(short, long, default_value_t = 1)]
        speedup: u32,

        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aurora_storefront=info,aurora_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> aurora_storefront::error::Result<()> {
    match cli.command {
        Commands::Shipping { total, threshold } => {
            let threshold = threshold.unwrap_or(config.free_shipping_threshold);
            commands::shipping::run(total, threshold, config.currency);
        }
        Commands::Replay {
            script,
            speedup,
            dry_run,
        } => commands::replay::run(&script, speedup, dry_run, config).await?,
    }
    Ok(())
}
