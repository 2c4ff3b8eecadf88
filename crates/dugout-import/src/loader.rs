// Table loader: applies one CSV file to one store table under a merge
// strategy and collects the rows it touched.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use dugout_core::coerce::{to_float, to_int};
use dugout_core::table::FRACTIONAL;
use dugout_core::{Field, Row, TableKind};
use dugout_store::{Database, StoreError, TableSession};

use crate::session::SessionFile;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How an incoming row treats a stored row with the same primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Replace the stored row.
    Overwrite,
    /// Keep the stored row.
    Skip,
    /// Sum raw counters, keep derived columns, take other incoming values.
    Merge,
}

/// Per-table result counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableTally {
    pub inserted: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub error: bool,
}

impl TableTally {
    pub fn errored() -> Self {
        TableTally {
            error: true,
            ..TableTally::default()
        }
    }

    pub fn absorb(&mut self, other: TableTally) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.overwritten += other.overwritten;
        self.error |= other.error;
    }

    pub fn rows(&self) -> usize {
        self.inserted + self.skipped + self.overwritten
    }
}

impl fmt::Display for TableTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} skipped, {} overwritten",
            self.inserted, self.skipped, self.overwritten
        )?;
        if self.error {
            f.write_str(" (error)")?;
        }
        Ok(())
    }
}

/// Rows accepted during a session, per table, in file order. Consumed once
/// by the reconciler.
#[derive(Debug, Default)]
pub struct RowBatch {
    rows: BTreeMap<TableKind, Vec<Row>>,
}

impl RowBatch {
    pub fn push(&mut self, table: TableKind, row: Row) {
        self.rows.entry(table).or_default().push(row);
    }

    pub fn rows(&self, table: TableKind) -> &[Row] {
        self.rows.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read header of {source_name}: {source}")]
    Header { source_name: String, source: csv::Error },

    #[error("no column of {source_name} matches table {table}")]
    NoMatchingColumns { table: TableKind, source_name: String },

    #[error("store error while loading {table}: {source}")]
    Store { table: TableKind, source: StoreError },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load one session file, recording any failure as an errored tally.
pub fn load_table(
    db: &Database,
    file: &SessionFile,
    strategy: MergeStrategy,
    batch: &mut RowBatch,
) -> TableTally {
    match load_table_from_path(db, file.table, &file.path, strategy, batch) {
        Ok(tally) => {
            info!("{} <- {}: {tally}", file.table, file.path.display());
            tally
        }
        Err(e) => {
            warn!("{} not loaded: {e}", file.table);
            TableTally::errored()
        }
    }
}

pub fn load_table_from_path(
    db: &Database,
    table: TableKind,
    path: &Path,
    strategy: MergeStrategy,
    batch: &mut RowBatch,
) -> Result<TableTally, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_table_from_reader(db, table, file, &path.display().to_string(), strategy, batch)
}

/// Apply CSV rows from `rdr` to `table`. All writes happen in one
/// transaction that is committed before the rows reach `batch`.
pub fn load_table_from_reader<R: Read>(
    db: &Database,
    table: TableKind,
    rdr: R,
    source_name: &str,
    strategy: MergeStrategy,
    batch: &mut RowBatch,
) -> Result<TableTally, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| LoadError::Header {
            source_name: source_name.to_string(),
            source: e,
        })?
        .clone();

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed row in {source_name}: {e}"),
        }
    }

    let loaded = db
        .with_table(table, |session| {
            let columns: Vec<(usize, String)> = headers
                .iter()
                .enumerate()
                .filter_map(|(i, h)| session.canonical_column(h).map(|c| (i, c.to_string())))
                .collect();
            if columns.is_empty() {
                return Ok(None);
            }
            debug!("{table}: {} of {} columns match", columns.len(), headers.len());

            let mut tally = TableTally::default();
            let mut touched = Vec::new();
            for record in &records {
                let row: Row = columns
                    .iter()
                    .filter_map(|(i, name)| record.get(*i).map(|raw| (name.clone(), Field::parse(raw))))
                    .collect();
                match apply_row(session, &row, strategy) {
                    Ok(RowOutcome::Skipped) => tally.skipped += 1,
                    Ok(outcome) => {
                        match outcome {
                            RowOutcome::Inserted => tally.inserted += 1,
                            _ => tally.overwritten += 1,
                        }
                        touched.push(row);
                    }
                    Err(e) => warn!("{table}: row not written: {e}"),
                }
            }
            Ok(Some((tally, touched)))
        })
        .map_err(|e| LoadError::Store { table, source: e })?;

    let Some((tally, touched)) = loaded else {
        return Err(LoadError::NoMatchingColumns {
            table,
            source_name: source_name.to_string(),
        });
    };
    for row in touched {
        batch.push(table, row);
    }
    Ok(tally)
}

enum RowOutcome {
    Inserted,
    Overwritten,
    Skipped,
}

fn apply_row(
    session: &TableSession<'_>,
    row: &Row,
    strategy: MergeStrategy,
) -> Result<RowOutcome, StoreError> {
    let kind = session.kind();
    let key = row.get(kind.primary_key()).cloned().unwrap_or(Field::Null);

    match strategy {
        MergeStrategy::Overwrite => {
            let existed = session.exists(&key)?;
            session.insert(row, true)?;
            Ok(if existed {
                RowOutcome::Overwritten
            } else {
                RowOutcome::Inserted
            })
        }
        MergeStrategy::Skip => {
            if session.exists(&key)? {
                return Ok(RowOutcome::Skipped);
            }
            session.insert(row, false)?;
            Ok(RowOutcome::Inserted)
        }
        MergeStrategy::Merge => match session.fetch(&key)? {
            None => {
                session.insert(row, false)?;
                Ok(RowOutcome::Inserted)
            }
            Some(stored) => {
                session.update(&key, &merge_row(kind, &stored, row))?;
                Ok(RowOutcome::Overwritten)
            }
        },
    }
}

/// Column-wise merge of an incoming row over a stored one. Returns only the
/// columns to write: the key and derived columns are never written, null
/// cells keep the stored value, additive counters are summed.
pub fn merge_row(kind: TableKind, stored: &Row, incoming: &Row) -> Row {
    let mut merged = Row::new();
    for (column, field) in incoming {
        if column == kind.primary_key() || kind.is_derived(column) {
            continue;
        }
        let Some(raw) = field.as_text() else {
            continue;
        };
        let value = if kind.is_additive(column) {
            let old = stored.get(column).and_then(Field::as_text).unwrap_or("");
            if FRACTIONAL.contains(&column.as_str()) {
                let sum = to_float(old) + to_float(raw);
                ((sum * 1000.0).round() / 1000.0).to_string()
            } else {
                to_int(old).saturating_add(to_int(raw)).to_string()
            }
        } else {
            raw.to_string()
        };
        merged.insert(column.clone(), Field::Value(value));
    }
    merged
}
