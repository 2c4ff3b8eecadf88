// Pitching counters and ratios, and the Pitcher subtype that carries them.

use serde::{Deserialize, Serialize};

use crate::error::StatError;
use crate::player::Player;
use crate::stats::{self, Rate};

/// Innings a pitcher may log per game played.
pub const MAX_INNINGS_PER_GAME: f64 = 9.0;

/// One raw pitching counter. Column names match the `pitcher` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchingStat {
    Wins,
    Losses,
    GamesPlayed,
    GamesStarted,
    GamesCompleted,
    Shutouts,
    Saves,
    SaveOpportunities,
    InningsPitched,
    BattersFaced,
    Hits,
    Runs,
    EarnedRuns,
    HomeRuns,
    HitBatters,
    Walks,
    Strikeouts,
}

impl PitchingStat {
    pub const ALL: [PitchingStat; 17] = [
        PitchingStat::Wins,
        PitchingStat::Losses,
        PitchingStat::GamesPlayed,
        PitchingStat::GamesStarted,
        PitchingStat::GamesCompleted,
        PitchingStat::Shutouts,
        PitchingStat::Saves,
        PitchingStat::SaveOpportunities,
        PitchingStat::InningsPitched,
        PitchingStat::BattersFaced,
        PitchingStat::Hits,
        PitchingStat::Runs,
        PitchingStat::EarnedRuns,
        PitchingStat::HomeRuns,
        PitchingStat::HitBatters,
        PitchingStat::Walks,
        PitchingStat::Strikeouts,
    ];

    /// Games before the game-bounded counters, batters faced before the
    /// events bounded by it, innings last.
    pub const MERGE_ORDER: [PitchingStat; 17] = [
        PitchingStat::GamesPlayed,
        PitchingStat::Wins,
        PitchingStat::Losses,
        PitchingStat::GamesStarted,
        PitchingStat::GamesCompleted,
        PitchingStat::Shutouts,
        PitchingStat::Saves,
        PitchingStat::SaveOpportunities,
        PitchingStat::BattersFaced,
        PitchingStat::Hits,
        PitchingStat::Walks,
        PitchingStat::Strikeouts,
        PitchingStat::HomeRuns,
        PitchingStat::HitBatters,
        PitchingStat::Runs,
        PitchingStat::EarnedRuns,
        PitchingStat::InningsPitched,
    ];

    pub fn column(self) -> &'static str {
        match self {
            PitchingStat::Wins => "wins",
            PitchingStat::Losses => "losses",
            PitchingStat::GamesPlayed => "games_played",
            PitchingStat::GamesStarted => "games_started",
            PitchingStat::GamesCompleted => "games_completed",
            PitchingStat::Shutouts => "shutouts",
            PitchingStat::Saves => "saves",
            PitchingStat::SaveOpportunities => "save_ops",
            PitchingStat::InningsPitched => "ip",
            PitchingStat::BattersFaced => "p_at_bats",
            PitchingStat::Hits => "p_hits",
            PitchingStat::Runs => "p_runs",
            PitchingStat::EarnedRuns => "er",
            PitchingStat::HomeRuns => "p_hr",
            PitchingStat::HitBatters => "p_hb",
            PitchingStat::Walks => "p_bb",
            PitchingStat::Strikeouts => "p_so",
        }
    }

    /// Whether the counter holds fractional values (innings).
    pub fn is_fractional(self) -> bool {
        matches!(self, PitchingStat::InningsPitched)
    }

    fn is_batter_event(self) -> bool {
        matches!(
            self,
            PitchingStat::Hits
                | PitchingStat::Walks
                | PitchingStat::Strikeouts
                | PitchingStat::HomeRuns
                | PitchingStat::HitBatters
        )
    }
}

/// Raw pitching counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pitching {
    pub wins: i64,
    pub losses: i64,
    pub games_played: i64,
    pub games_started: i64,
    pub games_completed: i64,
    pub shutouts: i64,
    pub saves: i64,
    pub save_ops: i64,
    pub ip: f64,
    pub p_at_bats: i64,
    pub p_hits: i64,
    pub p_runs: i64,
    pub er: i64,
    pub p_hr: i64,
    pub p_hb: i64,
    pub p_bb: i64,
    pub p_so: i64,
}

impl Pitching {
    pub fn get(&self, stat: PitchingStat) -> f64 {
        match stat {
            PitchingStat::InningsPitched => self.ip,
            other => *self.count(other) as f64,
        }
    }

    fn count(&self, stat: PitchingStat) -> &i64 {
        match stat {
            PitchingStat::Wins => &self.wins,
            PitchingStat::Losses => &self.losses,
            PitchingStat::GamesPlayed => &self.games_played,
            PitchingStat::GamesStarted => &self.games_started,
            PitchingStat::GamesCompleted => &self.games_completed,
            PitchingStat::Shutouts => &self.shutouts,
            PitchingStat::Saves => &self.saves,
            PitchingStat::SaveOpportunities => &self.save_ops,
            PitchingStat::BattersFaced => &self.p_at_bats,
            PitchingStat::Hits => &self.p_hits,
            PitchingStat::Runs => &self.p_runs,
            PitchingStat::EarnedRuns => &self.er,
            PitchingStat::HomeRuns => &self.p_hr,
            PitchingStat::HitBatters => &self.p_hb,
            PitchingStat::Walks => &self.p_bb,
            PitchingStat::Strikeouts => &self.p_so,
            // Innings are fractional and never read through here.
            PitchingStat::InningsPitched => &0,
        }
    }

    fn count_mut(&mut self, stat: PitchingStat) -> Option<&mut i64> {
        Some(match stat {
            PitchingStat::Wins => &mut self.wins,
            PitchingStat::Losses => &mut self.losses,
            PitchingStat::GamesPlayed => &mut self.games_played,
            PitchingStat::GamesStarted => &mut self.games_started,
            PitchingStat::GamesCompleted => &mut self.games_completed,
            PitchingStat::Shutouts => &mut self.shutouts,
            PitchingStat::Saves => &mut self.saves,
            PitchingStat::SaveOpportunities => &mut self.save_ops,
            PitchingStat::BattersFaced => &mut self.p_at_bats,
            PitchingStat::Hits => &mut self.p_hits,
            PitchingStat::Runs => &mut self.p_runs,
            PitchingStat::EarnedRuns => &mut self.er,
            PitchingStat::HomeRuns => &mut self.p_hr,
            PitchingStat::HitBatters => &mut self.p_hb,
            PitchingStat::Walks => &mut self.p_bb,
            PitchingStat::Strikeouts => &mut self.p_so,
            PitchingStat::InningsPitched => return None,
        })
    }

    /// Set a counter outright, clamping negatives to zero.
    pub fn set(&mut self, stat: PitchingStat, value: f64) {
        let value = value.max(0.0);
        match self.count_mut(stat) {
            Some(slot) => *slot = value.trunc() as i64,
            None => self.ip = value,
        }
    }

    fn batter_events(&self) -> i64 {
        [self.p_bb, self.p_so, self.p_hr, self.p_hb]
            .into_iter()
            .fold(self.p_hits, i64::saturating_add)
    }

    /// Apply a delta to one counter, rejecting it if the result would break
    /// an invariant. Deltas for whole-number counters are truncated.
    pub fn apply(&mut self, stat: PitchingStat, delta: f64) -> Result<(), StatError> {
        let delta = if stat.is_fractional() {
            delta
        } else {
            delta.trunc()
        };
        if delta == 0.0 || !delta.is_finite() {
            return Ok(());
        }
        let current = self.get(stat);
        let next = current + delta;
        if next < 0.0 {
            return Err(StatError::Negative {
                stat: stat.column(),
                current,
                delta,
            });
        }

        let games = self.games_played as f64;
        let bound = |name: &'static str, value: f64, limit: f64| -> Result<(), StatError> {
            if value > limit {
                Err(StatError::ExceedsBound {
                    stat: stat.column(),
                    bound: name,
                    value,
                    limit,
                })
            } else {
                Ok(())
            }
        };

        match stat {
            PitchingStat::Wins | PitchingStat::Losses => bound(
                "games_played",
                (self.wins + self.losses) as f64 + delta,
                games,
            )?,
            PitchingStat::GamesStarted
            | PitchingStat::GamesCompleted
            | PitchingStat::Saves
            | PitchingStat::SaveOpportunities => bound("games_played", next, games)?,
            PitchingStat::Shutouts => bound("games_completed", next, self.games_completed as f64)?,
            PitchingStat::Runs | PitchingStat::EarnedRuns => {
                bound("p_at_bats", next, self.p_at_bats as f64)?
            }
            s if s.is_batter_event() => bound(
                "p_at_bats",
                self.batter_events() as f64 + delta,
                self.p_at_bats as f64,
            )?,
            PitchingStat::InningsPitched => {
                bound("games_played", next, games * MAX_INNINGS_PER_GAME)?
            }
            PitchingStat::GamesPlayed => {
                let floor = [
                    self.wins + self.losses,
                    self.games_started,
                    self.games_completed,
                    self.saves,
                    self.save_ops,
                ]
                .into_iter()
                .max()
                .unwrap_or(0) as f64;
                if next < floor {
                    return Err(StatError::ExceedsBound {
                        stat: "games_played",
                        bound: "games_played",
                        value: floor,
                        limit: next,
                    });
                }
            }
            PitchingStat::BattersFaced => {
                let floor = self.batter_events().max(self.p_runs).max(self.er) as f64;
                if next < floor {
                    return Err(StatError::ExceedsBound {
                        stat: "p_at_bats",
                        bound: "p_at_bats",
                        value: floor,
                        limit: next,
                    });
                }
            }
            _ => {}
        }

        self.set(stat, next);
        Ok(())
    }
}

/// Derived pitching ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingRates {
    pub era: Rate,
    pub whip: Rate,
    pub p_avg: Rate,
    pub k_9: Rate,
    pub bb_9: Rate,
}

impl PitchingRates {
    pub fn from_counters(p: &Pitching) -> Self {
        PitchingRates {
            era: stats::era(p.er, p.ip),
            whip: stats::whip(p.p_bb, p.p_hits, p.ip),
            p_avg: stats::opponent_average(p.p_hits, p.p_at_bats),
            k_9: stats::per_nine(p.p_so, p.ip),
            bb_9: stats::per_nine(p.p_bb, p.ip),
        }
    }

    /// Column name and value for every ratio, as stored in the `pitcher` table.
    pub fn columns(&self) -> [(&'static str, Rate); 5] {
        [
            ("era", self.era),
            ("WHIP", self.whip),
            ("p_avg", self.p_avg),
            ("k_9", self.k_9),
            ("bb_9", self.bb_9),
        ]
    }
}

// ---------------------------------------------------------------------------
// Pitcher
// ---------------------------------------------------------------------------

/// A player with pitching capability. Offense lives in `player` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitcher {
    pub player: Player,
    pub pitching: Pitching,
    pub rates: PitchingRates,
}

impl Pitcher {
    /// Consume a batter and a pitching line to produce a pitcher. The
    /// batter's offensive counters carry over as they are.
    pub fn promote(mut player: Player, pitching: Pitching) -> Self {
        player.add_position("pitcher");
        let rates = PitchingRates::from_counters(&pitching);
        Pitcher {
            player,
            pitching,
            rates,
        }
    }

    pub fn recompute(&mut self) {
        self.player.recompute();
        self.rates = PitchingRates::from_counters(&self.pitching);
    }
}
