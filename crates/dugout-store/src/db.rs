// SQLite persistence for the league graph.
//
// Import writes go through one `TableSession` per table file, each committed
// on its own. Reads rebuild the league graph; derived statistics are written
// back in a final pass.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info, warn};

use dugout_core::coerce::{self, field_id};
use dugout_core::{Field, Row, TableKind};
use dugout_league::mapping::{self, pitching_from_row, player_from_row, team_from_row};
use dugout_league::{League, LeagueAdmin, Pitcher, Pitching, Rate, Rostered};

use crate::schema::{self, Affinity};

// ---------------------------------------------------------------------------
// Errors and column metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table `{table}` is not present in the store")]
    MissingTable { table: TableKind },

    #[error("store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub affinity: Affinity,
    pub primary_key: bool,
}

/// A derived-statistics write that failed for one entity.
#[derive(Debug, Clone)]
pub struct PersistFailure {
    pub entity: String,
    pub message: String,
}

/// SQLite-backed store for the league, team, player and pitcher tables.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        // Session files may reference teams that arrive later in the same
        // batch, so references are declared but not enforced.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = OFF;",
        )
        .context("failed to set database pragmas")?;

        Self::create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        for kind in TableKind::ALL {
            conn.execute_batch(&schema::create_sql(kind))
                .with_context(|| format!("failed to create table {kind}"))?;
        }
        Ok(())
    }

    /// Acquire the connection lock.
    ///
    /// Panics if the mutex is poisoned, which only happens if another thread
    /// panicked while holding it.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert a row for `league`, admin fields included, if the league table
    /// is empty.
    pub fn ensure_league(&self, league: &League) -> Result<()> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM league", [], |row| row.get(0))
            .context("failed to count league rows")?;
        if count == 0 {
            let fields = LeagueAdmin::FIELDS;
            let placeholders: Vec<String> = (1..=fields.len() + 1).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO league (leagueID, {}) VALUES ({})",
                fields.join(", "),
                placeholders.join(", ")
            );
            let values = std::iter::once(Value::Integer(league.id)).chain(fields.iter().map(|f| {
                match league.admin.get(f) {
                    Some(text) => Value::Text(text.to_string()),
                    None => Value::Null,
                }
            }));
            conn.execute(&sql, params_from_iter(values))
                .context("failed to insert league row")?;
        }
        Ok(())
    }

    /// Drop every table and recreate an empty schema holding only `league`.
    pub fn reset_schema(&self, league: &League) -> Result<()> {
        {
            let conn = self.conn();
            for table in Self::user_tables(&conn)? {
                conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))
                    .with_context(|| format!("failed to drop table {table}"))?;
            }
            Self::create_tables(&conn)?;
        }
        info!("store schema reset");
        self.ensure_league(league)
    }

    fn user_tables(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .context("failed to prepare table listing")?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .context("failed to list tables")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("failed to read table names")?;
        Ok(names)
    }

    /// Columns of one table. Empty if the table does not exist.
    pub fn table_columns(&self, kind: TableKind) -> Result<Vec<ColumnInfo>, StoreError> {
        read_columns(&self.conn(), kind)
    }

    /// Run `f` against one table inside a transaction, committing when it
    /// returns `Ok`. Fails with `MissingTable` if the table has no columns.
    pub fn with_table<T>(
        &self,
        kind: TableKind,
        f: impl FnOnce(&TableSession<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn();
        let columns = read_columns(&conn, kind)?;
        if columns.is_empty() {
            return Err(StoreError::MissingTable { table: kind });
        }
        let tx = conn.transaction()?;
        let out = {
            let session = TableSession {
                conn: &tx,
                kind,
                columns,
            };
            f(&session)?
        };
        tx.commit()?;
        Ok(out)
    }

    /// Every row of a table as ordered (header, values) pairs.
    pub fn dump_table(&self, kind: TableKind) -> Result<(Vec<String>, Vec<Vec<Field>>)> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM \"{}\" ORDER BY rowid", kind.name()))
            .with_context(|| format!("failed to prepare dump of {kind}"))?;
        let headers: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let width = headers.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(value_to_field))
                    .collect::<rusqlite::Result<Vec<Field>>>()
            })
            .with_context(|| format!("failed to query {kind}"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read {kind} rows"))?;
        Ok((headers, rows))
    }

    /// Every row of a table as column maps, in insertion order.
    pub fn rows(&self, kind: TableKind) -> Result<Vec<Row>> {
        let (headers, rows) = self.dump_table(kind)?;
        Ok(rows
            .into_iter()
            .map(|values| headers.iter().cloned().zip(values).collect())
            .collect())
    }

    /// One row by primary key.
    pub fn row(&self, kind: TableKind, id: i64) -> Result<Option<Row>> {
        Ok(self
            .rows(kind)?
            .into_iter()
            .find(|row| field_id(row.get(kind.primary_key())) == Some(id)))
    }

    pub fn row_count(&self, kind: TableKind) -> Result<usize> {
        let conn = self.conn();
        let n: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", kind.name()), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("failed to count {kind} rows"))?;
        Ok(n as usize)
    }

    // -----------------------------------------------------------------------
    // Graph hydration
    // -----------------------------------------------------------------------

    /// Rebuild the league graph from storage. Uses the most recently written
    /// league row, or a fresh league named `default_name` if there is none.
    pub fn load_league(&self, default_name: &str) -> Result<League> {
        let league_row = self.rows(TableKind::League)?.pop();
        let mut league = League::new(default_name);
        if let Some(row) = &league_row {
            if let Some(id) = field_id(row.get("leagueID")) {
                league.id = id;
            }
            mapping::apply_league_row(&mut league.admin, row);
        }

        for row in self.rows(TableKind::Team)? {
            let (mut team, record) = team_from_row(&row);
            if let Err(e) = record {
                warn!("stored record for team '{}' is inconsistent: {e}", team.name);
            }
            team.logo = row.get("logo").and_then(Field::non_empty).map(str::to_string);
            league.add_team(team);
        }

        let mut pitcher_rows: HashMap<i64, Row> = HashMap::new();
        for row in self.rows(TableKind::Pitcher)? {
            match field_id(row.get("playerID")) {
                Some(id) => {
                    pitcher_rows.insert(id, row);
                }
                None => warn!("skipping stored pitcher row without playerID"),
            }
        }

        for row in self.rows(TableKind::Player)? {
            let mut player = player_from_row(&row);
            player.image = row.get("image").and_then(Field::non_empty).map(str::to_string);
            let pitching = pitcher_rows.remove(&player.id).map(|r| pitching_from_row(&r));
            let entry = match pitching {
                Some(p) => Rostered::Pitcher(Pitcher::promote(player, p)),
                None if player.plays("pitcher") => {
                    Rostered::Pitcher(Pitcher::promote(player, Pitching::default()))
                }
                None => Rostered::Batter(player),
            };
            attach(&mut league, entry);
        }

        // Pitchers with no player row still belong on their team.
        let mut orphans: Vec<Row> = pitcher_rows.into_values().collect();
        orphans.sort_by_key(|r| field_id(r.get("playerID")));
        for row in orphans {
            let player = player_from_row(&row);
            let entry = Rostered::Pitcher(Pitcher::promote(player, pitching_from_row(&row)));
            attach(&mut league, entry);
        }

        league.recompute_all();
        debug!(
            "loaded league '{}' with {} teams and {} players",
            league.name(),
            league.teams.len(),
            league.player_count()
        );
        Ok(league)
    }

    // -----------------------------------------------------------------------
    // Derived-statistics persistence
    // -----------------------------------------------------------------------

    /// Write every recomputed ratio back to storage: player and pitcher rates,
    /// team aggregates and roster names. Failures are logged and returned per
    /// entity; they do not stop the pass.
    pub fn persist_derived(&self, league: &League) -> Result<Vec<PersistFailure>> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin derived-stat transaction")?;
        let mut failures = Vec::new();

        for team in &league.teams {
            let result = serde_json::to_string(&team.player_names())
                .map_err(anyhow::Error::from)
                .and_then(|players| {
                    tx.execute(
                        "UPDATE team SET wl_avg = ?1, bat_avg = ?2, team_era = ?3, players = ?4
                         WHERE teamID = ?5",
                        params![
                            team.wl_avg.value(),
                            team.bat_avg.value(),
                            team.team_era.value(),
                            players,
                            team.id
                        ],
                    )
                    .map_err(anyhow::Error::from)
                });
            if let Err(e) = result {
                warn!("failed to persist aggregates for team '{}': {e}", team.name);
                failures.push(PersistFailure {
                    entity: team.name.clone(),
                    message: e.to_string(),
                });
            }

            for entry in &team.roster {
                if let Err(e) = persist_entry(&tx, entry) {
                    warn!("failed to persist derived stats for '{}': {e}", entry.name());
                    failures.push(PersistFailure {
                        entity: entry.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tx.commit().context("failed to commit derived stats")?;
        Ok(failures)
    }
}

fn persist_entry(conn: &Connection, entry: &Rostered) -> rusqlite::Result<()> {
    let player = entry.player();
    update_rates(conn, TableKind::Player, player.id, &player.rates.columns())?;
    if let Some(pitcher) = entry.pitcher() {
        update_rates(conn, TableKind::Pitcher, player.id, &pitcher.rates.columns())?;
    }
    Ok(())
}

/// `UPDATE` the ratio columns of one row keyed by `id`.
fn update_rates(conn: &Connection, kind: TableKind, id: i64, rates: &[(&str, Rate)]) -> rusqlite::Result<()> {
    let assignments: Vec<String> = rates
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {kind} SET {} WHERE {} = ?{}",
        assignments.join(", "),
        kind.primary_key(),
        rates.len() + 1
    );
    let values = rates
        .iter()
        .map(|(_, rate)| Value::Real(rate.value()))
        .chain(std::iter::once(Value::Integer(id)));
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Put a hydrated entry on its team: by stored team id, then team name.
fn attach(league: &mut League, entry: Rostered) {
    let player = entry.player();
    let index = player
        .team_id
        .and_then(|id| league.team_index_by_id(id))
        .or_else(|| {
            player
                .team_name
                .as_deref()
                .and_then(|name| league.team_index_by_name(name))
        });
    match index {
        Some(i) => {
            let team = &mut league.teams[i];
            let name = entry.name().to_string();
            if !team.add(entry) {
                warn!("stored player '{name}' not added to '{}' (full or duplicate)", team.name);
            }
        }
        None => warn!("stored player '{}' has no matching team", player.name),
    }
}

// ---------------------------------------------------------------------------
// Per-table writer session
// ---------------------------------------------------------------------------

/// Row-level access to one table inside an open transaction.
pub struct TableSession<'a> {
    conn: &'a Connection,
    kind: TableKind,
    columns: Vec<ColumnInfo>,
}

impl TableSession<'_> {
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// The table's spelling of a CSV header, matched case-insensitively.
    pub fn canonical_column(&self, header: &str) -> Option<&str> {
        let header = header.trim();
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(header))
            .map(|c| c.name.as_str())
    }

    fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Convert a cell to a typed value for `column`. Empty numeric cells in
    /// the key column become NULL so SQLite assigns a key.
    fn bind(&self, column: &str, field: &Field) -> Value {
        let Some(info) = self.column(column) else {
            return field_to_text(field);
        };
        let Some(raw) = field.as_text() else {
            return Value::Null;
        };
        match info.affinity {
            Affinity::Integer if raw.trim().is_empty() && info.primary_key => Value::Null,
            Affinity::Integer => match coerce::normalize_id(raw) {
                Some(n) => Value::Integer(n),
                None => Value::Integer(coerce::to_int(raw)),
            },
            Affinity::Real if raw.trim().is_empty() => Value::Real(0.0),
            Affinity::Real => Value::Real(coerce::to_float(raw)),
            Affinity::Text => Value::Text(raw.to_string()),
        }
    }

    fn key_value(&self, key: &Field) -> Value {
        self.bind(self.kind.primary_key(), key)
    }

    /// The stored row with this primary key, if any.
    pub fn fetch(&self, key: &Field) -> Result<Option<Row>, StoreError> {
        let key = self.key_value(key);
        if key == Value::Null {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM \"{}\" WHERE \"{}\" = ?1",
            self.kind.name(),
            self.kind.primary_key()
        ))?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let row = stmt
            .query_row([key], |row| {
                names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Ok((name.clone(), value_to_field(row.get::<_, Value>(i)?))))
                    .collect::<rusqlite::Result<Row>>()
            })
            .optional()?;
        Ok(row)
    }

    pub fn exists(&self, key: &Field) -> Result<bool, StoreError> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Insert a row, or replace the stored row with the same key.
    pub fn insert(&self, row: &Row, replace: bool) -> Result<(), StoreError> {
        if row.is_empty() {
            return Ok(());
        }
        let columns: Vec<String> = row.keys().map(|c| format!("\"{c}\"")).collect();
        let slots: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT {}INTO \"{}\" ({}) VALUES ({})",
            if replace { "OR REPLACE " } else { "" },
            self.kind.name(),
            columns.join(", "),
            slots.join(", ")
        );
        let values = row.iter().map(|(c, f)| self.bind(c, f));
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }

    /// Overwrite the given columns of the stored row with this key. The key
    /// column itself is never changed.
    pub fn update(&self, key: &Field, row: &Row) -> Result<(), StoreError> {
        let pk = self.kind.primary_key();
        let assignments: Vec<(&String, &Field)> = row.iter().filter(|(c, _)| c.as_str() != pk).collect();
        if assignments.is_empty() {
            return Ok(());
        }
        let set = assignments
            .iter()
            .enumerate()
            .map(|(i, (c, _))| format!("\"{c}\" = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ?{}",
            self.kind.name(),
            set,
            pk,
            assignments.len() + 1
        );
        let mut values: Vec<Value> = assignments.iter().map(|(c, f)| self.bind(c, f)).collect();
        values.push(self.key_value(key));
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_columns(conn: &Connection, kind: TableKind) -> Result<Vec<ColumnInfo>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", kind.name()))?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let decl: Option<String> = row.get(2)?;
            let pk: i64 = row.get(5)?;
            Ok(ColumnInfo {
                name,
                affinity: Affinity::from_decl(decl.as_deref().unwrap_or("")),
                primary_key: pk > 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn value_to_field(value: Value) -> Field {
    match value {
        Value::Null => Field::Null,
        Value::Integer(i) => Field::Value(i.to_string()),
        Value::Real(f) => Field::Value(f.to_string()),
        Value::Text(s) => Field::Value(s),
        Value::Blob(b) => Field::Value(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn field_to_text(field: &Field) -> Value {
    match field.as_text() {
        Some(s) => Value::Text(s.to_string()),
        None => Value::Null,
    }
}
