// Batters: identity, raw counting stats, and the derived batting ratios.

use serde::{Deserialize, Serialize};

use crate::error::StatError;
use crate::stats::{self, Rate};

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// One raw batting counter. Column names match the `player` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattingStat {
    PlateAppearances,
    AtBats,
    FieldersChoice,
    Hits,
    Walks,
    HitByPitch,
    PutOuts,
    Strikeouts,
    HomeRuns,
    Rbi,
    Runs,
    Singles,
    Doubles,
    Triples,
    SacFlies,
}

impl BattingStat {
    pub const ALL: [BattingStat; 15] = [
        BattingStat::PlateAppearances,
        BattingStat::AtBats,
        BattingStat::FieldersChoice,
        BattingStat::Hits,
        BattingStat::Walks,
        BattingStat::HitByPitch,
        BattingStat::PutOuts,
        BattingStat::Strikeouts,
        BattingStat::HomeRuns,
        BattingStat::Rbi,
        BattingStat::Runs,
        BattingStat::Singles,
        BattingStat::Doubles,
        BattingStat::Triples,
        BattingStat::SacFlies,
    ];

    /// Order in which merge deltas are applied. Frame counters first so that
    /// hits have room, hits before the hit types they bound, cosmetic
    /// counters last since they need at-bats.
    pub const MERGE_ORDER: [BattingStat; 15] = [
        BattingStat::PlateAppearances,
        BattingStat::AtBats,
        BattingStat::Hits,
        BattingStat::Singles,
        BattingStat::Doubles,
        BattingStat::Triples,
        BattingStat::HomeRuns,
        BattingStat::Walks,
        BattingStat::HitByPitch,
        BattingStat::FieldersChoice,
        BattingStat::Strikeouts,
        BattingStat::SacFlies,
        BattingStat::PutOuts,
        BattingStat::Rbi,
        BattingStat::Runs,
    ];

    pub fn column(self) -> &'static str {
        match self {
            BattingStat::PlateAppearances => "pa",
            BattingStat::AtBats => "at_bat",
            BattingStat::FieldersChoice => "fielder_choice",
            BattingStat::Hits => "hit",
            BattingStat::Walks => "bb",
            BattingStat::HitByPitch => "hbp",
            BattingStat::PutOuts => "put_out",
            BattingStat::Strikeouts => "so",
            BattingStat::HomeRuns => "hr",
            BattingStat::Rbi => "rbi",
            BattingStat::Runs => "runs",
            BattingStat::Singles => "singles",
            BattingStat::Doubles => "doubles",
            BattingStat::Triples => "triples",
            BattingStat::SacFlies => "sac_fly",
        }
    }

    fn is_hit_type(self) -> bool {
        matches!(
            self,
            BattingStat::Singles | BattingStat::Doubles | BattingStat::Triples | BattingStat::HomeRuns
        )
    }
}

/// Raw batting counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub pa: i64,
    pub at_bat: i64,
    pub fielder_choice: i64,
    pub hit: i64,
    pub bb: i64,
    pub hbp: i64,
    pub put_out: i64,
    pub so: i64,
    pub hr: i64,
    pub rbi: i64,
    pub runs: i64,
    pub singles: i64,
    pub doubles: i64,
    pub triples: i64,
    pub sac_fly: i64,
}

impl BattingLine {
    pub fn get(&self, stat: BattingStat) -> i64 {
        match stat {
            BattingStat::PlateAppearances => self.pa,
            BattingStat::AtBats => self.at_bat,
            BattingStat::FieldersChoice => self.fielder_choice,
            BattingStat::Hits => self.hit,
            BattingStat::Walks => self.bb,
            BattingStat::HitByPitch => self.hbp,
            BattingStat::PutOuts => self.put_out,
            BattingStat::Strikeouts => self.so,
            BattingStat::HomeRuns => self.hr,
            BattingStat::Rbi => self.rbi,
            BattingStat::Runs => self.runs,
            BattingStat::Singles => self.singles,
            BattingStat::Doubles => self.doubles,
            BattingStat::Triples => self.triples,
            BattingStat::SacFlies => self.sac_fly,
        }
    }

    fn slot(&mut self, stat: BattingStat) -> &mut i64 {
        match stat {
            BattingStat::PlateAppearances => &mut self.pa,
            BattingStat::AtBats => &mut self.at_bat,
            BattingStat::FieldersChoice => &mut self.fielder_choice,
            BattingStat::Hits => &mut self.hit,
            BattingStat::Walks => &mut self.bb,
            BattingStat::HitByPitch => &mut self.hbp,
            BattingStat::PutOuts => &mut self.put_out,
            BattingStat::Strikeouts => &mut self.so,
            BattingStat::HomeRuns => &mut self.hr,
            BattingStat::Rbi => &mut self.rbi,
            BattingStat::Runs => &mut self.runs,
            BattingStat::Singles => &mut self.singles,
            BattingStat::Doubles => &mut self.doubles,
            BattingStat::Triples => &mut self.triples,
            BattingStat::SacFlies => &mut self.sac_fly,
        }
    }

    fn hit_types(&self) -> i64 {
        [self.doubles, self.triples, self.hr]
            .into_iter()
            .fold(self.singles, i64::saturating_add)
    }
}

/// Derived batting ratios, rebuilt by `Player::recompute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingRates {
    pub avg: Rate,
    pub obp: Rate,
    pub slg: Rate,
    pub babip: Rate,
    pub iso: Rate,
}

impl BattingRates {
    /// Column name and value for every ratio, as stored in the `player` table.
    pub fn columns(&self) -> [(&'static str, Rate); 5] {
        [
            ("OBP", self.obp),
            ("BABIP", self.babip),
            ("SLG", self.slg),
            ("AVG", self.avg),
            ("ISO", self.iso),
        ]
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub team_id: Option<i64>,
    pub league_id: Option<i64>,
    /// Name of the owning team, kept for export.
    pub team_name: Option<String>,
    pub number: Option<i64>,
    pub positions: Vec<String>,
    pub image: Option<String>,
    pub batting: BattingLine,
    pub rates: BattingRates,
}

impl Player {
    /// A new player whose id is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Player {
            id: crate::derive_id(&name),
            name,
            team_id: None,
            league_id: None,
            team_name: None,
            number: None,
            positions: Vec::new(),
            image: None,
            batting: BattingLine::default(),
            rates: BattingRates::default(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn plays(&self, position: &str) -> bool {
        self.positions
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(position))
    }

    /// Add a position if the player does not already have it.
    pub fn add_position(&mut self, position: &str) {
        if !self.plays(position) {
            self.positions.push(position.to_string());
        }
    }

    /// Set a counter outright, as when reading a fresh row. Negative values
    /// are clamped to zero.
    pub fn set_counter(&mut self, stat: BattingStat, value: i64) {
        *self.batting.slot(stat) = value.max(0);
    }

    /// Apply an incoming delta to one counter, rejecting it if the result
    /// would break an invariant. On error the counter is unchanged.
    pub fn apply(&mut self, stat: BattingStat, delta: i64) -> Result<(), StatError> {
        if delta == 0 {
            return Ok(());
        }
        let line = &self.batting;
        let current = line.get(stat);
        let Some(next) = current.checked_add(delta) else {
            return Err(StatError::Overflow {
                stat: stat.column(),
                current,
                delta,
            });
        };
        if next < 0 {
            return Err(StatError::Negative {
                stat: stat.column(),
                current: current as f64,
                delta: delta as f64,
            });
        }

        match stat {
            BattingStat::AtBats if next < line.hit => {
                return Err(exceeds(BattingStat::Hits, "at_bat", line.hit, next));
            }
            BattingStat::Hits if next > line.at_bat => {
                return Err(exceeds(stat, "at_bat", next, line.at_bat));
            }
            BattingStat::Hits if next < line.hit_types() => {
                return Err(exceeds(BattingStat::Singles, "hit", line.hit_types(), next));
            }
            s if s.is_hit_type() && line.hit_types().saturating_add(delta) > line.hit => {
                return Err(exceeds(s, "hit", line.hit_types().saturating_add(delta), line.hit));
            }
            BattingStat::Strikeouts if next > line.at_bat => {
                return Err(exceeds(stat, "at_bat", next, line.at_bat));
            }
            BattingStat::Rbi | BattingStat::Runs if line.at_bat == 0 => {
                return Err(StatError::NoAtBats {
                    stat: stat.column(),
                });
            }
            _ => {}
        }

        *self.batting.slot(stat) = next;
        Ok(())
    }

    /// Rebuild AVG, OBP, SLG, BABIP and ISO from the counters.
    pub fn recompute(&mut self) {
        let b = &self.batting;
        self.rates = BattingRates {
            avg: stats::batting_average(b.hit, b.at_bat),
            obp: stats::on_base(b.hit, b.bb, b.hbp, b.at_bat, b.sac_fly, b.pa),
            slg: stats::slugging(b.singles, b.doubles, b.triples, b.hr, b.at_bat),
            babip: stats::babip(b.hit, b.hr, b.at_bat, b.so, b.sac_fly),
            iso: stats::isolated_power(b.doubles, b.triples, b.hr, b.at_bat),
        };
    }
}

fn exceeds(stat: BattingStat, bound: &'static str, value: i64, limit: i64) -> StatError {
    StatError::ExceedsBound {
        stat: stat.column(),
        bound,
        value: value as f64,
        limit: limit as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batter(hit: i64, at_bat: i64) -> Player {
        let mut p = Player::new("Ann Lee").with_id(50);
        p.set_counter(BattingStat::AtBats, at_bat);
        p.set_counter(BattingStat::PlateAppearances, at_bat);
        p.set_counter(BattingStat::Hits, hit);
        p
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    #[test]
    fn hits_cannot_exceed_at_bats() {
        let mut p = batter(2, 5);
        let err = p.apply(BattingStat::Hits, 4).unwrap_err();
        assert_eq!(err.stat(), "hit");
        assert_eq!(p.batting.hit, 2);
    }

    #[test]
    fn hit_types_bounded_by_hits() {
        let mut p = batter(3, 10);
        p.apply(BattingStat::Singles, 2).unwrap();
        p.apply(BattingStat::HomeRuns, 1).unwrap();
        assert!(p.apply(BattingStat::Doubles, 1).is_err());
        assert_eq!(p.batting.doubles, 0);
    }

    #[test]
    fn at_bats_cannot_drop_below_hits() {
        let mut p = batter(4, 5);
        assert!(p.apply(BattingStat::AtBats, -2).is_err());
        assert_eq!(p.batting.at_bat, 5);
    }

    #[test]
    fn no_counter_goes_negative() {
        let mut p = batter(1, 3);
        let err = p.apply(BattingStat::Walks, -1).unwrap_err();
        assert!(matches!(err, StatError::Negative { .. }));
    }

    #[test]
    fn rbi_and_runs_need_at_bats() {
        let mut p = Player::new("No Bats");
        assert!(matches!(
            p.apply(BattingStat::Rbi, 1),
            Err(StatError::NoAtBats { .. })
        ));
        let mut p = batter(1, 2);
        p.apply(BattingStat::Runs, 1).unwrap();
        assert_eq!(p.batting.runs, 1);
    }

    #[test]
    fn overflowing_delta_is_rejected() {
        let mut p = batter(1, 3);
        p.set_counter(BattingStat::Walks, i64::MAX);
        let err = p.apply(BattingStat::Walks, 1).unwrap_err();
        assert!(matches!(err, StatError::Overflow { stat: "bb", .. }));
        assert_eq!(p.batting.bb, i64::MAX);
    }

    #[test]
    fn set_counter_clamps_negative() {
        let mut p = Player::new("X");
        p.set_counter(BattingStat::Strikeouts, -4);
        assert_eq!(p.batting.so, 0);
    }

    // ------------------------------------------------------------------
    // Derived ratios
    // ------------------------------------------------------------------

    #[test]
    fn recompute_average() {
        let mut p = batter(2, 5);
        p.recompute();
        assert_eq!(p.rates.avg.to_string(), "0.400");
    }

    #[test]
    fn zero_at_bats_reports_zero_rates() {
        let mut p = Player::new("Bench");
        p.set_counter(BattingStat::Walks, 3);
        p.set_counter(BattingStat::PlateAppearances, 3);
        p.recompute();
        for rate in [p.rates.avg, p.rates.slg, p.rates.babip, p.rates.iso] {
            assert_eq!(rate.to_string(), "0.000");
        }
    }

    #[test]
    fn merge_order_covers_every_counter_once() {
        for stat in BattingStat::ALL {
            let n = BattingStat::MERGE_ORDER.iter().filter(|s| **s == stat).count();
            assert_eq!(n, 1, "{}", stat.column());
        }
    }

    #[test]
    fn positions_match_case_insensitively() {
        let mut p = Player::new("Flex");
        p.positions = vec!["Pitcher".into()];
        assert!(p.plays("pitcher"));
        p.add_position("pitcher");
        assert_eq!(p.positions.len(), 1);
    }
}
