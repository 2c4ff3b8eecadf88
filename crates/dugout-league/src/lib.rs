// League object graph and derived statistics.

pub mod error;
pub mod league;
pub mod mapping;
pub mod pitching;
pub mod player;
pub mod stats;
pub mod team;

pub use error::StatError;
pub use league::{League, LeagueAdmin};
pub use pitching::{Pitcher, Pitching, PitchingRates, PitchingStat};
pub use player::{BattingLine, BattingRates, BattingStat, Player};
pub use stats::Rate;
pub use team::{Rostered, Team};

/// Deterministic id for an entity created from a name alone: each character
/// code weighted by the index of its first occurrence (the first character
/// weighs 2).
pub fn derive_id(name: &str) -> i64 {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .map(|c| {
            let first = chars.iter().position(|x| x == c).unwrap_or(0);
            let weight = if first == 0 { 2 } else { first as i64 };
            *c as i64 * weight
        })
        .sum()
}
