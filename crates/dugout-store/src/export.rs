// CSV export of every entity table as one session.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use dugout_core::TableKind;

use crate::db::Database;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create export directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: csv::Error },

    #[error("failed to read table {table}: {source}")]
    Read {
        table: TableKind,
        source: anyhow::Error,
    },
}

/// Files written by one export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub token: String,
    pub files: Vec<(TableKind, PathBuf, usize)>,
}

/// Write `<table>_<token>.csv` for every table into `out_dir`. The token is a
/// timestamp; if any target already exists it gains a `(n)` suffix so the
/// export always forms exactly one session.
pub fn export_session(db: &Database, out_dir: &Path) -> Result<ExportReport, ExportError> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    export_session_with_token(db, out_dir, &stamp)
}

pub fn export_session_with_token(
    db: &Database,
    out_dir: &Path,
    stamp: &str,
) -> Result<ExportReport, ExportError> {
    std::fs::create_dir_all(out_dir).map_err(|e| ExportError::CreateDir {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let token = free_token(out_dir, stamp);
    let mut files = Vec::new();
    for kind in TableKind::ALL {
        let path = out_dir.join(format!("{}_{token}.csv", kind.name()));
        let (headers, rows) = db
            .dump_table(kind)
            .map_err(|e| ExportError::Read { table: kind, source: e })?;

        let write_err = |e: csv::Error| ExportError::Write {
            path: path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(write_err)?;
        wtr.write_record(&headers).map_err(write_err)?;
        for row in &rows {
            wtr.write_record(row.iter().map(|f| f.to_csv())).map_err(write_err)?;
        }
        wtr.flush().map_err(|e| write_err(e.into()))?;

        info!("exported {} {} rows to {}", rows.len(), kind, path.display());
        files.push((kind, path, rows.len()));
    }

    Ok(ExportReport { token, files })
}

fn free_token(out_dir: &Path, stamp: &str) -> String {
    let taken = |token: &str| {
        TableKind::ALL
            .iter()
            .any(|k| out_dir.join(format!("{}_{token}.csv", k.name())).exists())
    };
    if !taken(stamp) {
        return stamp.to_string();
    }
    (1..)
        .map(|n| format!("{stamp}({n})"))
        .find(|t| !taken(t))
        .unwrap_or_else(|| stamp.to_string())
}
