// Command surface: argument definitions and the handlers behind them.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use dugout_core::config::Config;
use dugout_import::{
    discover_sessions, ImportOutcome, ImportStrategy, ImportSummary, Importer, Preselected,
    Sessions,
};
use dugout_league::{League, Rostered};
use dugout_store::{export_session, Database};

#[derive(Parser)]
#[command(name = "dugout")]
#[command(about = "League statistics store with CSV session import and export", long_about = None)]
pub struct Cli {
    /// Base directory holding config/ and defaults/
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// SQLite database path, overriding the configured one
    #[arg(long, global = true, env = "DUGOUT_DB_PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the CSV sessions found under a directory
    Sessions {
        dir: PathBuf,
    },
    /// Import one session into the store
    Import {
        dir: PathBuf,
        /// new, replace, merge or skip
        #[arg(short, long)]
        strategy: ImportStrategy,
        /// Session token, required when the directory holds several
        #[arg(long)]
        session: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export every table as one CSV session
    Export {
        /// Output directory (defaults to the configured exports path)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the league as currently stored
    Show,
}

pub fn run(command: Commands, config: &Config, db: &Database, league: &mut League) -> Result<()> {
    match command {
        Commands::Sessions { dir } => {
            let sessions = discover_sessions(&dir);
            if sessions.is_empty() {
                println!("No valid sessions under {}", dir.display());
            } else {
                print_sessions(&sessions);
            }
            Ok(())
        }
        Commands::Import {
            dir,
            strategy,
            session,
            json,
        } => import(config, db, league, dir, strategy, session, json),
        Commands::Export { out } => {
            let out = out.unwrap_or_else(|| config.paths.exports.clone());
            let report = export_session(db, &out).context("export failed")?;
            println!("Exported session {} to {}", report.token, out.display());
            for (table, path, rows) in &report.files {
                println!("  {table:<8} {rows:>5} rows  {}", path.display());
            }
            Ok(())
        }
        Commands::Show => {
            print_league(league);
            Ok(())
        }
    }
}

fn import(
    config: &Config,
    db: &Database,
    league: &mut League,
    dir: PathBuf,
    strategy: ImportStrategy,
    session: Option<String>,
    json: bool,
) -> Result<()> {
    let sessions = discover_sessions(&dir);
    let mut prompt = Preselected {
        session: session.clone(),
        strategy: Some(strategy),
    };
    let outcome = Importer::new(db, league)
        .images_dir(&config.paths.images)
        .default_max_roster(config.league.default_max_roster)
        .run_sessions(&sessions, &mut prompt)?;

    match outcome {
        ImportOutcome::NoSessions => bail!("no valid sessions under {}", dir.display()),
        ImportOutcome::Aborted { .. } => {
            match session {
                Some(token) => println!("Session {token} not found. Available sessions:"),
                None => println!("Several sessions found; choose one with --session:"),
            }
            print_sessions(&sessions);
            Ok(())
        }
        ImportOutcome::Summarized(summary) if json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        ImportOutcome::Summarized(summary) => {
            print_summary(&summary);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_sessions(sessions: &Sessions) {
    for (token, files) in sessions {
        let tables: Vec<String> = files.iter().map(|f| f.table.to_string()).collect();
        println!("  {token:<20} {}", tables.join(", "));
    }
}

fn print_summary(summary: &ImportSummary) {
    println!("Session {} imported ({})", summary.session, summary.strategy);
    for (table, tally) in &summary.tables {
        println!("  {table:<8} {tally}");
    }
    println!("  {:<8} {}", "total", summary.totals());
    if !summary.warnings.is_empty() {
        println!("{} warnings:", summary.warnings.len());
        for warning in &summary.warnings {
            println!("  - {warning}");
        }
    }
}

fn print_league(league: &League) {
    println!("{} (id {})", league.name(), league.id);
    for team in &league.teams {
        println!(
            "  {} (id {}): {}-{} in {}  W-L {}  AVG {}  ERA {}  roster {}{}",
            team.name,
            team.id,
            team.wins,
            team.losses,
            team.games_played,
            team.wl_avg,
            team.bat_avg,
            team.team_era,
            team.roster.len(),
            team.max_roster.map(|m| format!("/{m}")).unwrap_or_default(),
        );
        for entry in &team.roster {
            let player = entry.player();
            match entry {
                Rostered::Pitcher(p) => println!(
                    "    {:<24} AVG {}  ERA {}  WHIP {}",
                    player.name, player.rates.avg, p.rates.era, p.rates.whip
                ),
                Rostered::Batter(_) => println!(
                    "    {:<24} AVG {}  OBP {}  SLG {}",
                    player.name, player.rates.avg, player.rates.obp, player.rates.slg
                ),
            }
        }
    }
}
