// Import orchestrator: session choice, strategy choice, per-table loading,
// one reconcile pass, derived-stat persistence, summary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use dugout_core::TableKind;
use dugout_league::League;
use dugout_store::Database;

use crate::loader::{load_table, MergeStrategy, RowBatch, TableTally};
use crate::reconcile::{reconcile, MergeWarning, ReconcileOptions, WarningKind};
use crate::session::{discover_sessions, SessionFile, Sessions};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// What the operator asked an import to do with the existing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// Start from an empty store and a fresh league.
    NewDatabase,
    /// Keep the league, drop every team and row, then load.
    Replace,
    /// Add counters into what is already stored.
    Merge,
    /// Keep what is stored; only insert new keys.
    Skip,
}

impl ImportStrategy {
    pub const ALL: [ImportStrategy; 4] = [
        ImportStrategy::NewDatabase,
        ImportStrategy::Replace,
        ImportStrategy::Merge,
        ImportStrategy::Skip,
    ];

    /// Row-level strategy the table loader runs under.
    pub fn merge_strategy(self) -> MergeStrategy {
        match self {
            ImportStrategy::NewDatabase | ImportStrategy::Replace => MergeStrategy::Overwrite,
            ImportStrategy::Merge => MergeStrategy::Merge,
            ImportStrategy::Skip => MergeStrategy::Skip,
        }
    }

    pub fn resets_store(self) -> bool {
        matches!(self, ImportStrategy::NewDatabase | ImportStrategy::Replace)
    }

    pub fn name(self) -> &'static str {
        match self {
            ImportStrategy::NewDatabase => "new",
            ImportStrategy::Replace => "replace",
            ImportStrategy::Merge => "merge",
            ImportStrategy::Skip => "skip",
        }
    }
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" | "new-database" | "new_database" => Ok(ImportStrategy::NewDatabase),
            "replace" => Ok(ImportStrategy::Replace),
            "merge" => Ok(ImportStrategy::Merge),
            "skip" => Ok(ImportStrategy::Skip),
            other => Err(format!(
                "unknown import strategy '{other}' (expected new, replace, merge or skip)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Phases and caller hooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportPhase {
    Idle,
    SessionChosen,
    StrategyChosen,
    Importing,
    Reconciling,
    Persisting,
    Summarized,
    Aborted,
}

impl ImportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportPhase::Summarized | ImportPhase::Aborted)
    }
}

/// The caller's side of the two selection points. Returning `None` cancels
/// the import; nothing has been written at either point.
pub trait ImportPrompt {
    fn choose_session(&mut self, sessions: &Sessions) -> Option<String>;
    fn choose_strategy(&mut self, token: &str, files: &[SessionFile]) -> Option<ImportStrategy>;
}

/// Choices made up front, e.g. from command-line flags. Without an explicit
/// session token, a lone session is taken and several sessions cancel.
#[derive(Debug, Clone, Default)]
pub struct Preselected {
    pub session: Option<String>,
    pub strategy: Option<ImportStrategy>,
}

impl ImportPrompt for Preselected {
    fn choose_session(&mut self, sessions: &Sessions) -> Option<String> {
        match &self.session {
            Some(token) => sessions.contains_key(token).then(|| token.clone()),
            None if sessions.len() == 1 => sessions.keys().next().cloned(),
            None => None,
        }
    }

    fn choose_strategy(&mut self, _token: &str, _files: &[SessionFile]) -> Option<ImportStrategy> {
        self.strategy
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub session: String,
    pub strategy: ImportStrategy,
    pub tables: BTreeMap<TableKind, TableTally>,
    pub warnings: Vec<MergeWarning>,
}

impl ImportSummary {
    pub fn totals(&self) -> TableTally {
        let mut total = TableTally::default();
        for tally in self.tables.values() {
            total.absorb(*tally);
        }
        total
    }

    pub fn table(&self, kind: TableKind) -> TableTally {
        self.tables.get(&kind).copied().unwrap_or_default()
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &MergeWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub enum ImportOutcome {
    /// The directory held no valid session; nothing was written.
    NoSessions,
    /// The caller cancelled at `phase`; nothing was written.
    Aborted { phase: ImportPhase },
    Summarized(ImportSummary),
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

/// Drives one import against a store and the in-memory league that mirrors
/// it.
pub struct Importer<'a> {
    db: &'a Database,
    league: &'a mut League,
    images_dir: PathBuf,
    default_max_roster: Option<usize>,
    phase: ImportPhase,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database, league: &'a mut League) -> Self {
        Importer {
            db,
            league,
            images_dir: PathBuf::from("data/images"),
            default_max_roster: None,
            phase: ImportPhase::Idle,
        }
    }

    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = dir.into();
        self
    }

    pub fn default_max_roster(mut self, max: Option<usize>) -> Self {
        self.default_max_roster = max;
        self
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// Scan `dir` and run the full workflow.
    pub fn run(&mut self, dir: &Path, prompt: &mut dyn ImportPrompt) -> Result<ImportOutcome> {
        let sessions = discover_sessions(dir);
        self.run_sessions(&sessions, prompt)
    }

    pub fn run_sessions(
        &mut self,
        sessions: &Sessions,
        prompt: &mut dyn ImportPrompt,
    ) -> Result<ImportOutcome> {
        self.phase = ImportPhase::Idle;
        if sessions.is_empty() {
            warn!("no valid sessions found");
            return Ok(ImportOutcome::NoSessions);
        }

        let Some((token, files)) = prompt
            .choose_session(sessions)
            .and_then(|token| sessions.get_key_value(&token))
        else {
            return Ok(self.abort());
        };
        self.phase = ImportPhase::SessionChosen;

        let Some(strategy) = prompt.choose_strategy(token, files) else {
            return Ok(self.abort());
        };
        self.phase = ImportPhase::StrategyChosen;

        let summary = self.import_session(token, files, strategy)?;
        Ok(ImportOutcome::Summarized(summary))
    }

    fn abort(&mut self) -> ImportOutcome {
        let phase = self.phase;
        self.phase = ImportPhase::Aborted;
        info!("import cancelled at {phase:?}");
        ImportOutcome::Aborted { phase }
    }

    /// Import one chosen session. Only a failure to reset the store is
    /// returned as an error; everything after that degrades into the
    /// summary.
    pub fn import_session(
        &mut self,
        token: &str,
        files: &[SessionFile],
        strategy: ImportStrategy,
    ) -> Result<ImportSummary> {
        info!("importing session {token} ({} files) with strategy {strategy}", files.len());
        self.prepare_store(strategy)?;

        self.phase = ImportPhase::Importing;
        let merge = strategy.merge_strategy();
        let mut batch = RowBatch::default();
        let mut tables: BTreeMap<TableKind, TableTally> = BTreeMap::new();
        for file in files {
            let tally = load_table(self.db, file, merge, &mut batch);
            tables.entry(file.table).or_default().absorb(tally);
        }

        self.phase = ImportPhase::Reconciling;
        let options = ReconcileOptions {
            strategy: merge,
            images_dir: self.images_dir.clone(),
            default_max_roster: self.default_max_roster,
        };
        let mut warnings = reconcile(&mut *self.league, &batch, &options);

        self.phase = ImportPhase::Persisting;
        warnings.extend(self.persist());

        self.phase = ImportPhase::Summarized;
        let summary = ImportSummary {
            session: token.to_string(),
            strategy,
            tables,
            warnings,
        };
        for (kind, tally) in &summary.tables {
            info!("{kind}: {tally}");
        }
        info!(
            "session {token} done: {} ({} warnings)",
            summary.totals(),
            summary.warnings.len()
        );
        Ok(summary)
    }

    fn prepare_store(&mut self, strategy: ImportStrategy) -> Result<()> {
        match strategy {
            ImportStrategy::NewDatabase => {
                let mut fresh = League::new(self.league.name());
                fresh.id = self.league.id;
                *self.league = fresh;
            }
            ImportStrategy::Replace => self.league.clear_teams(),
            ImportStrategy::Merge | ImportStrategy::Skip => return Ok(()),
        }
        self.db
            .reset_schema(&*self.league)
            .with_context(|| format!("failed to reset store for {strategy} import"))
    }

    fn persist(&self) -> Vec<MergeWarning> {
        match self.db.persist_derived(&*self.league) {
            Ok(failures) => failures
                .into_iter()
                .map(|f| MergeWarning::new(WarningKind::Persist, f.entity, f.message))
                .collect(),
            Err(e) => {
                warn!("derived statistics not persisted: {e:#}");
                vec![MergeWarning::new(WarningKind::Persist, "store", format!("{e:#}"))]
            }
        }
    }
}
