// Teams and their rosters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StatError;
use crate::pitching::{Pitcher, Pitching};
use crate::player::Player;
use crate::stats::{self, Rate};

/// Fielding positions every team starts with, unassigned.
pub const DEFAULT_POSITIONS: [&str; 9] = [
    "pitcher",
    "catcher",
    "first base",
    "second base",
    "third base",
    "shortstop",
    "left field",
    "center field",
    "right field",
];

const DEFAULT_LINEUP_SLOTS: usize = 9;

// ---------------------------------------------------------------------------
// Roster entries
// ---------------------------------------------------------------------------

/// A roster entry: a plain batter or a pitcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rostered {
    Batter(Player),
    Pitcher(Pitcher),
}

impl Rostered {
    pub fn player(&self) -> &Player {
        match self {
            Rostered::Batter(p) => p,
            Rostered::Pitcher(p) => &p.player,
        }
    }

    pub fn player_mut(&mut self) -> &mut Player {
        match self {
            Rostered::Batter(p) => p,
            Rostered::Pitcher(p) => &mut p.player,
        }
    }

    pub fn pitcher(&self) -> Option<&Pitcher> {
        match self {
            Rostered::Pitcher(p) => Some(p),
            Rostered::Batter(_) => None,
        }
    }

    pub fn pitcher_mut(&mut self) -> Option<&mut Pitcher> {
        match self {
            Rostered::Pitcher(p) => Some(p),
            Rostered::Batter(_) => None,
        }
    }

    pub fn id(&self) -> i64 {
        self.player().id
    }

    pub fn name(&self) -> &str {
        &self.player().name
    }

    /// Turn this entry into a pitcher carrying `pitching`. A batter keeps
    /// its offense; an existing pitcher has its pitching line replaced.
    pub fn promote(self, pitching: Pitching) -> Self {
        match self {
            Rostered::Batter(player) => Rostered::Pitcher(Pitcher::promote(player, pitching)),
            Rostered::Pitcher(mut pitcher) => {
                pitcher.pitching = pitching;
                pitcher.recompute();
                Rostered::Pitcher(pitcher)
            }
        }
    }

    pub fn recompute(&mut self) {
        match self {
            Rostered::Batter(p) => p.recompute(),
            Rostered::Pitcher(p) => p.recompute(),
        }
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub league_id: Option<i64>,
    pub league_name: Option<String>,
    pub manager: Option<String>,
    pub logo: Option<String>,
    pub roster: Vec<Rostered>,
    /// Batting-order slot ("1".."N") to player name.
    pub lineup: BTreeMap<String, String>,
    /// Position name to player name.
    pub positions: BTreeMap<String, String>,
    pub wins: i64,
    pub losses: i64,
    pub games_played: i64,
    pub wl_avg: Rate,
    pub bat_avg: Rate,
    pub team_era: Rate,
    /// `None` means no cap.
    pub max_roster: Option<usize>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut team = Team {
            id: crate::derive_id(&name),
            name,
            league_id: None,
            league_name: None,
            manager: None,
            logo: None,
            roster: Vec::new(),
            lineup: BTreeMap::new(),
            positions: DEFAULT_POSITIONS
                .iter()
                .map(|p| (p.to_string(), String::new()))
                .collect(),
            wins: 0,
            losses: 0,
            games_played: 0,
            wl_avg: Rate::ZERO,
            bat_avg: Rate::ZERO,
            team_era: Rate::ZERO,
            max_roster: None,
        };
        team.fill_lineup_slots();
        team
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set the roster cap and make sure the lineup has a slot per spot.
    pub fn set_max_roster(&mut self, max: Option<usize>) {
        self.max_roster = max;
        self.fill_lineup_slots();
    }

    fn fill_lineup_slots(&mut self) {
        let slots = self.max_roster.unwrap_or(DEFAULT_LINEUP_SLOTS);
        for slot in 1..=slots {
            self.lineup.entry(slot.to_string()).or_default();
        }
    }

    pub fn is_full(&self) -> bool {
        self.max_roster.is_some_and(|max| self.roster.len() >= max)
    }

    /// Append to the roster. Returns `false` without changing anything when
    /// the roster is full or the player id is already present.
    pub fn add(&mut self, entry: Rostered) -> bool {
        if self.is_full() {
            debug!("team '{}' is full, not adding '{}'", self.name, entry.name());
            return false;
        }
        if self.position_of_id(entry.id()).is_some() {
            return false;
        }
        self.roster.push(entry);
        true
    }

    pub fn position_of_id(&self, id: i64) -> Option<usize> {
        self.roster.iter().position(|e| e.id() == id)
    }

    /// Case-insensitive, whitespace-trimmed name lookup.
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        self.roster
            .iter()
            .position(|e| normalize_name(e.name()) == wanted)
    }

    /// Promote the entry at `index` to a pitcher in place.
    pub fn promote_at(&mut self, index: usize, pitching: Pitching) {
        if index >= self.roster.len() {
            return;
        }
        let entry = self.roster.remove(index);
        self.roster.insert(index, entry.promote(pitching));
    }

    /// Update the win/loss record, keeping wins + losses within games played.
    pub fn set_record(
        &mut self,
        wins: Option<i64>,
        losses: Option<i64>,
        games_played: Option<i64>,
    ) -> Result<(), StatError> {
        let wins = wins.unwrap_or(self.wins).max(0);
        let losses = losses.unwrap_or(self.losses).max(0);
        let games_played = games_played.unwrap_or(self.games_played).max(0);
        if wins + losses > games_played {
            return Err(StatError::ExceedsBound {
                stat: "wins",
                bound: "games_played",
                value: (wins + losses) as f64,
                limit: games_played as f64,
            });
        }
        self.wins = wins;
        self.losses = losses;
        self.games_played = games_played;
        Ok(())
    }

    pub fn player_names(&self) -> Vec<String> {
        self.roster.iter().map(|e| e.name().to_string()).collect()
    }

    /// Recompute every roster entry, then the team aggregates.
    pub fn recompute(&mut self) {
        for entry in &mut self.roster {
            entry.recompute();
        }
        self.recompute_aggregates();
    }

    /// Win-loss average, mean batting average, mean pitcher ERA.
    pub fn recompute_aggregates(&mut self) {
        self.wl_avg = stats::win_loss(self.wins, self.games_played);
        self.bat_avg = stats::mean(self.roster.iter().map(|e| e.player().rates.avg));
        self.team_era = stats::mean(
            self.roster
                .iter()
                .filter_map(Rostered::pitcher)
                .map(|p| p.rates.era),
        );
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
