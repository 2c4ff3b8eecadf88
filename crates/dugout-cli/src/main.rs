// Dugout entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (log to file, stdout is for command output)
// 4. Open the store and hydrate the league graph
// 5. Run the command

mod cli;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use dugout_core::config;
use dugout_league::League;
use dugout_store::Database;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let mut config = match &args.config_dir {
        Some(dir) => config::load_config_in(dir),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }

    init_tracing(&config.paths.logs)?;
    info!("dugout starting: league={}, db={}", config.league.name, config.db_path);

    let db = Database::open(&config.db_path).context("failed to open database")?;
    db.ensure_league(&League::new(config.league.name.as_str()))
        .context("failed to initialize league row")?;
    let mut league = db
        .load_league(&config.league.name)
        .context("failed to load league from the store")?;

    let result = cli::run(args.command, &config, &db, &mut league);
    if let Err(e) = &result {
        tracing::error!("command failed: {e:#}");
    }
    result
}

/// Initialize tracing to log to a file under `log_dir`.
fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("dugout.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dugout=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
