// Table definitions for the four entity tables.

use dugout_core::TableKind;

/// A column as declared in `CREATE TABLE`.
pub struct ColumnDef {
    pub name: &'static str,
    pub decl: &'static str,
}

const fn col(name: &'static str, decl: &'static str) -> ColumnDef {
    ColumnDef { name, decl }
}

const LEAGUE: &[ColumnDef] = &[
    col("leagueID", "INTEGER PRIMARY KEY"),
    col("name", "TEXT DEFAULT ''"),
    col("commissioner", "TEXT"),
    col("treasurer", "TEXT"),
    col("communications", "TEXT"),
    col("historian", "TEXT"),
    col("recruitment", "TEXT"),
    col("start", "TEXT"),
    col("stop", "TEXT"),
];

const TEAM: &[ColumnDef] = &[
    col("teamID", "INTEGER PRIMARY KEY"),
    col("name", "TEXT DEFAULT ''"),
    col("leagueID", "INTEGER REFERENCES league(leagueID)"),
    col("league", "TEXT"),
    col("logo", "TEXT"),
    col("manager", "TEXT"),
    col("players", "TEXT"),
    col("lineup", "TEXT"),
    col("positions", "TEXT"),
    col("wins", "INTEGER DEFAULT 0"),
    col("losses", "INTEGER DEFAULT 0"),
    col("games_played", "INTEGER DEFAULT 0"),
    col("wl_avg", "REAL DEFAULT 0"),
    col("bat_avg", "REAL DEFAULT 0"),
    col("team_era", "REAL DEFAULT 0"),
    col("max_roster", "INTEGER"),
];

const PLAYER: &[ColumnDef] = &[
    col("playerID", "INTEGER PRIMARY KEY"),
    col("name", "TEXT DEFAULT ''"),
    col("leagueID", "INTEGER REFERENCES league(leagueID)"),
    col("teamID", "INTEGER REFERENCES team(teamID)"),
    col("number", "INTEGER"),
    col("team", "TEXT"),
    col("positions", "TEXT"),
    col("pa", "INTEGER DEFAULT 0"),
    col("at_bat", "INTEGER DEFAULT 0"),
    col("fielder_choice", "INTEGER DEFAULT 0"),
    col("hit", "INTEGER DEFAULT 0"),
    col("bb", "INTEGER DEFAULT 0"),
    col("hbp", "INTEGER DEFAULT 0"),
    col("put_out", "INTEGER DEFAULT 0"),
    col("so", "INTEGER DEFAULT 0"),
    col("hr", "INTEGER DEFAULT 0"),
    col("rbi", "INTEGER DEFAULT 0"),
    col("runs", "INTEGER DEFAULT 0"),
    col("singles", "INTEGER DEFAULT 0"),
    col("doubles", "INTEGER DEFAULT 0"),
    col("triples", "INTEGER DEFAULT 0"),
    col("sac_fly", "INTEGER DEFAULT 0"),
    col("OBP", "REAL DEFAULT 0"),
    col("BABIP", "REAL DEFAULT 0"),
    col("SLG", "REAL DEFAULT 0"),
    col("AVG", "REAL DEFAULT 0"),
    col("ISO", "REAL DEFAULT 0"),
    col("image", "TEXT"),
];

const PITCHER: &[ColumnDef] = &[
    col("playerID", "INTEGER PRIMARY KEY REFERENCES player(playerID)"),
    col("leagueID", "INTEGER REFERENCES league(leagueID)"),
    col("teamID", "INTEGER REFERENCES team(teamID)"),
    col("name", "TEXT DEFAULT ''"),
    col("wins", "INTEGER DEFAULT 0"),
    col("losses", "INTEGER DEFAULT 0"),
    col("era", "REAL DEFAULT 0"),
    col("games_played", "INTEGER DEFAULT 0"),
    col("games_started", "INTEGER DEFAULT 0"),
    col("games_completed", "INTEGER DEFAULT 0"),
    col("shutouts", "INTEGER DEFAULT 0"),
    col("saves", "INTEGER DEFAULT 0"),
    col("save_ops", "INTEGER DEFAULT 0"),
    col("ip", "REAL DEFAULT 0"),
    col("p_at_bats", "INTEGER DEFAULT 0"),
    col("p_hits", "INTEGER DEFAULT 0"),
    col("p_runs", "INTEGER DEFAULT 0"),
    col("er", "INTEGER DEFAULT 0"),
    col("p_hr", "INTEGER DEFAULT 0"),
    col("p_hb", "INTEGER DEFAULT 0"),
    col("p_bb", "INTEGER DEFAULT 0"),
    col("p_so", "INTEGER DEFAULT 0"),
    col("WHIP", "REAL DEFAULT 0"),
    col("p_avg", "REAL DEFAULT 0"),
    col("k_9", "REAL DEFAULT 0"),
    col("bb_9", "REAL DEFAULT 0"),
];

pub fn columns(kind: TableKind) -> &'static [ColumnDef] {
    match kind {
        TableKind::League => LEAGUE,
        TableKind::Team => TEAM,
        TableKind::Player => PLAYER,
        TableKind::Pitcher => PITCHER,
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for one table.
pub fn create_sql(kind: TableKind) -> String {
    let body = columns(kind)
        .iter()
        .map(|c| format!("    \"{}\" {}", c.name, c.decl))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n);", kind.name(), body)
}

/// Storage affinity of a declared column type, following SQLite's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    pub fn from_decl(decl: &str) -> Self {
        let upper = decl.to_ascii_uppercase();
        if upper.contains("INT") {
            Affinity::Integer
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Affinity::Real
        } else {
            Affinity::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_leads_with_its_primary_key() {
        for kind in TableKind::ALL {
            let first = &columns(kind)[0];
            assert_eq!(first.name, kind.primary_key());
            assert!(first.decl.contains("PRIMARY KEY"));
        }
    }

    #[test]
    fn additive_and_derived_columns_exist_in_schema() {
        for kind in TableKind::ALL {
            let names: Vec<&str> = columns(kind).iter().map(|c| c.name).collect();
            for col in kind.additive_columns().iter().chain(kind.derived_columns()) {
                assert!(names.contains(col), "{kind} is missing {col}");
            }
        }
    }

    #[test]
    fn affinity_from_declared_type() {
        assert_eq!(Affinity::from_decl("INTEGER PRIMARY KEY"), Affinity::Integer);
        assert_eq!(Affinity::from_decl("REAL DEFAULT 0"), Affinity::Real);
        assert_eq!(Affinity::from_decl("TEXT"), Affinity::Text);
        assert_eq!(Affinity::from_decl(""), Affinity::Text);
    }
}
