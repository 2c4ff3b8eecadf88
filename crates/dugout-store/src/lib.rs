// SQLite store for leagues, teams, players and pitchers, plus CSV export.

pub mod db;
pub mod export;
pub mod schema;

pub use db::{ColumnInfo, Database, PersistFailure, StoreError, TableSession};
pub use export::{export_session, ExportError, ExportReport};
