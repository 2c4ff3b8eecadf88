// CSV session import: grouping, per-table loading, graph reconciliation and
// the workflow that ties them together.

pub mod assets;
pub mod loader;
pub mod orchestrator;
pub mod reconcile;
pub mod session;

pub use loader::{LoadError, MergeStrategy, RowBatch, TableTally};
pub use orchestrator::{
    ImportOutcome, ImportPhase, ImportPrompt, ImportStrategy, ImportSummary, Importer, Preselected,
};
pub use reconcile::{reconcile, MergeWarning, ReconcileOptions, WarningKind};
pub use session::{discover_sessions, SessionFile, Sessions};
