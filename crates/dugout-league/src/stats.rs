// Derived-statistics calculator.
//
// Pure functions over raw counters. Every ratio guards its denominator and
// reports a zero rate instead of dividing by zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A ratio statistic rounded to three decimals. Displays as `0.400`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rate(f64);

impl Rate {
    pub const ZERO: Rate = Rate(0.0);

    /// Round `value` to three decimals. Non-finite input becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Rate((value * 1000.0).round() / 1000.0)
        } else {
            Rate::ZERO
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn ratio(num: f64, den: f64) -> Self {
        if den <= 0.0 {
            Rate::ZERO
        } else {
            Rate::new(num / den)
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Batting
// ---------------------------------------------------------------------------

/// Batting average: hits / at-bats.
pub fn batting_average(hit: i64, at_bat: i64) -> Rate {
    if hit <= 0 || at_bat <= 0 {
        return Rate::ZERO;
    }
    Rate::ratio(hit as f64, at_bat as f64)
}

/// On-base percentage: (H + BB + HBP) / (AB + BB + HBP + SF).
pub fn on_base(hit: i64, bb: i64, hbp: i64, at_bat: i64, sac_fly: i64, pa: i64) -> Rate {
    if pa <= 0 || at_bat <= 0 {
        return Rate::ZERO;
    }
    Rate::ratio(
        (hit + bb + hbp) as f64,
        (at_bat + bb + hbp + sac_fly) as f64,
    )
}

/// Total bases over at-bats.
pub fn slugging(singles: i64, doubles: i64, triples: i64, hr: i64, at_bat: i64) -> Rate {
    let total_bases = singles + 2 * doubles + 3 * triples + 4 * hr;
    Rate::ratio(total_bases as f64, at_bat as f64)
}

/// Batting average on balls in play: (H - HR) / (AB - SO - HR + SF).
pub fn babip(hit: i64, hr: i64, at_bat: i64, so: i64, sac_fly: i64) -> Rate {
    Rate::ratio((hit - hr) as f64, (at_bat - so - hr + sac_fly) as f64)
}

/// Isolated power: extra bases per at-bat, (2B + 2*3B + 3*HR) / AB.
pub fn isolated_power(doubles: i64, triples: i64, hr: i64, at_bat: i64) -> Rate {
    Rate::ratio((doubles + 2 * triples + 3 * hr) as f64, at_bat as f64)
}

// ---------------------------------------------------------------------------
// Pitching
// ---------------------------------------------------------------------------

/// Earned runs per nine innings.
pub fn era(er: i64, ip: f64) -> Rate {
    per_nine(er, ip)
}

/// Walks plus hits per inning pitched.
pub fn whip(bb: i64, hits: i64, ip: f64) -> Rate {
    Rate::ratio((bb + hits) as f64, ip)
}

/// Opponent batting average.
pub fn opponent_average(hits: i64, at_bats: i64) -> Rate {
    Rate::ratio(hits as f64, at_bats as f64)
}

/// Any counter scaled to nine innings (K/9, BB/9).
pub fn per_nine(count: i64, ip: f64) -> Rate {
    Rate::ratio(count as f64 * 9.0, ip)
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Win-loss average: wins / games played.
pub fn win_loss(wins: i64, games_played: i64) -> Rate {
    if wins <= 0 {
        return Rate::ZERO;
    }
    Rate::ratio(wins as f64, games_played as f64)
}

/// Mean of a set of rates; zero when empty.
pub fn mean(rates: impl IntoIterator<Item = Rate>) -> Rate {
    let (sum, n) = rates
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), r| (sum + r.value(), n + 1));
    if n == 0 {
        Rate::ZERO
    } else {
        Rate::new(sum / n as f64)
    }
}
