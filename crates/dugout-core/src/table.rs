// The four entity tables a session may carry, with their key columns and the
// column sets that get special treatment during a merge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw batting counters. Summed column-wise when a player row is merged.
pub const PLAYER_ADDITIVE: &[&str] = &[
    "pa",
    "at_bat",
    "fielder_choice",
    "hit",
    "bb",
    "hbp",
    "put_out",
    "so",
    "hr",
    "rbi",
    "runs",
    "singles",
    "doubles",
    "triples",
    "sac_fly",
];

/// Batting ratios. Never merged; recomputed after reconciliation.
pub const PLAYER_DERIVED: &[&str] = &["OBP", "BABIP", "SLG", "AVG", "ISO"];

/// Raw pitching counters. `ip` is the only fractional one.
pub const PITCHER_ADDITIVE: &[&str] = &[
    "wins",
    "losses",
    "games_played",
    "games_started",
    "games_completed",
    "shutouts",
    "saves",
    "save_ops",
    "ip",
    "p_at_bats",
    "p_hits",
    "p_runs",
    "er",
    "p_hr",
    "p_hb",
    "p_bb",
    "p_so",
];

/// Pitching ratios. Never merged; recomputed after reconciliation.
pub const PITCHER_DERIVED: &[&str] = &["WHIP", "p_avg", "k_9", "bb_9", "era"];

/// Additive columns holding fractional values.
pub const FRACTIONAL: &[&str] = &["ip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    League,
    Team,
    Player,
    Pitcher,
}

impl TableKind {
    /// Every table, in reconciliation order.
    pub const ALL: [TableKind; 4] = [
        TableKind::League,
        TableKind::Team,
        TableKind::Player,
        TableKind::Pitcher,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableKind::League => "league",
            TableKind::Team => "team",
            TableKind::Player => "player",
            TableKind::Pitcher => "pitcher",
        }
    }

    pub fn primary_key(self) -> &'static str {
        match self {
            TableKind::League => "leagueID",
            TableKind::Team => "teamID",
            TableKind::Player | TableKind::Pitcher => "playerID",
        }
    }

    pub fn additive_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Player => PLAYER_ADDITIVE,
            TableKind::Pitcher => PITCHER_ADDITIVE,
            TableKind::League | TableKind::Team => &[],
        }
    }

    pub fn derived_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Player => PLAYER_DERIVED,
            TableKind::Pitcher => PITCHER_DERIVED,
            TableKind::League | TableKind::Team => &[],
        }
    }

    pub fn is_additive(self, column: &str) -> bool {
        self.additive_columns().contains(&column)
    }

    pub fn is_derived(self, column: &str) -> bool {
        self.derived_columns().contains(&column)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "league" => Ok(TableKind::League),
            "team" => Ok(TableKind::Team),
            "player" => Ok(TableKind::Player),
            "pitcher" => Ok(TableKind::Pitcher),
            other => Err(format!("unknown table: {other}")),
        }
    }
}
