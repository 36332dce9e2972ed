//! Mart CLI - Cart tools for signed-in shoppers.
//!
//! # Usage
//!
//! ```bash
//! # Add product 3 to the cart
//! mart-cart add 3
//!
//! # Change product 3 to two units
//! mart-cart update 3 2
//!
//! # Remove product 3
//! mart-cart remove 3
//!
//! # Show the cart
//! mart-cart show
//!
//! # Use a different session file
//! mart-cart --session-file ~/.mart/session.json show
//! ```
//!
//! # Commands
//!
//! - `add` - Add a product to the cart
//! - `update` - Change a product's quantity
//! - `remove` - Remove a product
//! - `show` - Print the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mart_core::{ProductId, Quantity};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use commands::cart::{CartSession, CommandError};

#[derive(Parser)]
#[command(name = "mart-cart")]
#[command(author, version, about = "Mart cart CLI")]
struct Cli {
    /// Session file holding the access token
    #[arg(
        long,
        global = true,
        env = "MART_SESSION_FILE",
        default_value = ".mart-session.json"
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Change the quantity of a product in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (at least 1)
        quantity: Quantity,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Show the cart
    Show,
}

/// Initialize Sentry error tracking if `SENTRY_DSN` is set.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before reading SENTRY_DSN
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mart_cli=info,mart_cart_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let session = CartSession::open(&cli.session_file)?;

    match cli.command {
        Commands::Add { product_id } => session.add(product_id).await,
        Commands::Update {
            product_id,
            quantity,
        } => session.update(product_id, quantity).await,
        Commands::Remove { product_id } => session.remove(product_id).await,
        Commands::Show => session.show().await,
    }
}
