// Session grouping: classify CSV files into export snapshots by file name.
//
// A session file is named `<table>_<token>.csv` (case-insensitive), where the
// token is digits with an optional `(n)` disambiguator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use dugout_core::TableKind;

/// One file of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    pub table: TableKind,
    pub path: PathBuf,
}

/// Session token to its files, ordered league, team, player, pitcher.
pub type Sessions = BTreeMap<String, Vec<SessionFile>>;

fn session_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(league|team|player|pitcher)_([0-9]+(?:\([0-9]+\))?)\.csv$")
            .expect("session pattern is a valid regex")
    })
}

/// Every `*.csv` file under `dir`, recursively, in a stable order.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!("skipping unreadable entry under {}: {err}", dir.display());
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Classify a file name as `(table, token)`, or `None` if it is not a
/// session file.
pub fn classify(file_name: &str) -> Option<(TableKind, String)> {
    if file_name.to_ascii_lowercase().starts_with("sqlite_") {
        return None;
    }
    let caps = session_pattern().captures(file_name)?;
    let table = caps.get(1)?.as_str().parse::<TableKind>().ok()?;
    let token = caps.get(2)?.as_str().to_string();
    Some((table, token))
}

/// Group file paths into sessions. Non-matching files are ignored.
pub fn group_sessions<I, P>(paths: I) -> Sessions
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sessions = Sessions::new();
    for path in paths {
        let path = path.as_ref();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match classify(name) {
            Some((table, token)) => sessions.entry(token).or_default().push(SessionFile {
                table,
                path: path.to_path_buf(),
            }),
            None => debug!("ignoring non-session file {}", path.display()),
        }
    }
    for files in sessions.values_mut() {
        files.sort_by(|a, b| a.table.cmp(&b.table).then_with(|| a.path.cmp(&b.path)));
    }
    sessions
}

/// Scan `dir` recursively and group what is found.
pub fn discover_sessions(dir: &Path) -> Sessions {
    group_sessions(find_csv_files(dir))
}
