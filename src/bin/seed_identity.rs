//! Identity Bootstrap Tool
//!
//! One-shot seeding of roles and the initial user from a TOML seed file.
//! Safe to re-run: existing roles and users are left untouched.
//!
//! Usage:
//!   cargo run --bin seed_identity -- --seed-file seed.toml
//!   cargo run --bin seed_identity -- --seed-file seed.toml --db-path ./authgate_identity.db

use anyhow::{Context, Result};
use authgate::auth::bootstrap::{apply_seed, parse_seed_config};
use authgate::auth::SqliteUserStore;
use authgate::config::{load_env, resolve_data_path};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Identity bootstrap tool
#[derive(Parser, Debug)]
#[command(name = "seed_identity")]
#[command(about = "Create the configured roles and seed user if they do not exist")]
struct Cli {
    /// Path to the TOML seed file
    #[arg(short, long, default_value = "seed.toml")]
    seed_file: PathBuf,

    /// Path to the SQLite identity database (defaults to AUTH_DB_PATH)
    #[arg(short, long)]
    db_path: Option<String>,
}

fn main() -> Result<()> {
    load_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let db_path = resolve_data_path(
        cli.db_path.or_else(|| std::env::var("AUTH_DB_PATH").ok()),
        "authgate_identity.db",
    );

    let seed_text = fs::read_to_string(&cli.seed_file)
        .with_context(|| format!("Failed to read seed file {}", cli.seed_file.display()))?;
    let seed = parse_seed_config(&seed_text)?;

    let store = SqliteUserStore::new(&db_path)?;
    info!("Seeding identity store at: {}", db_path);

    let report = apply_seed(&store, &seed)?;

    info!(
        roles_created = report.roles_created,
        roles_existing = report.roles_existing,
        user_created = report.user_created,
        "Seeding complete"
    );

    Ok(())
}
