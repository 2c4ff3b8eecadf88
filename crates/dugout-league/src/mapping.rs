// Typed mappers between untyped rows and entities.
//
// Each entity's copyable columns are enumerated here once. Reference columns
// that need resolving (team links, asset paths) are left to the caller.

use dugout_core::coerce::{self, decode_list, decode_map, field_id, field_int};
use dugout_core::{Field, Row};

use crate::error::StatError;
use crate::league::LeagueAdmin;
use crate::pitching::{Pitching, PitchingStat};
use crate::player::{BattingStat, Player};
use crate::team::Team;

fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .and_then(Field::non_empty)
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Players and pitchers
// ---------------------------------------------------------------------------

/// Batting counters present in the row, in merge order.
pub fn batting_counts(row: &Row) -> Vec<(BattingStat, i64)> {
    BattingStat::MERGE_ORDER
        .iter()
        .filter_map(|&stat| {
            let field = row.get(stat.column())?;
            (!field.is_null()).then(|| (stat, field_int(Some(field))))
        })
        .collect()
}

/// Pitching counters present in the row, in merge order.
pub fn pitching_counts(row: &Row) -> Vec<(PitchingStat, f64)> {
    PitchingStat::MERGE_ORDER
        .iter()
        .filter_map(|&stat| {
            let raw = row.get(stat.column())?.as_text()?;
            let value = if stat.is_fractional() {
                coerce::to_float(raw)
            } else {
                coerce::to_int(raw) as f64
            };
            Some((stat, value))
        })
        .collect()
}

/// Build a player from a `player` row. The id comes from `playerID` when it
/// normalizes, otherwise from the name. Counters are set outright.
pub fn player_from_row(row: &Row) -> Player {
    let name = text(row, "name").unwrap_or_default();
    let mut player = Player::new(name);
    apply_player_identity(&mut player, row);
    for (stat, value) in batting_counts(row) {
        player.set_counter(stat, value);
    }
    player.recompute();
    player
}

/// Copy the identity columns of a player or pitcher row.
pub fn apply_player_identity(player: &mut Player, row: &Row) {
    if let Some(id) = field_id(row.get("playerID")) {
        player.id = id;
    }
    if let Some(name) = text(row, "name") {
        player.name = name;
    }
    if let Some(id) = field_id(row.get("teamID")) {
        player.team_id = Some(id);
    }
    if let Some(id) = field_id(row.get("leagueID")) {
        player.league_id = Some(id);
    }
    if let Some(team) = text(row, "team") {
        player.team_name = Some(team);
    }
    if let Some(number) = row.get("number").and_then(Field::non_empty) {
        player.number = Some(coerce::to_int(number));
    }
    if let Some(raw) = row.get("positions").and_then(Field::as_text) {
        let positions = decode_list(raw);
        if !positions.is_empty() {
            player.positions = positions;
        }
    }
}

/// Pitching counters of a `pitcher` row, set outright.
pub fn pitching_from_row(row: &Row) -> Pitching {
    let mut pitching = Pitching::default();
    for (stat, value) in pitching_counts(row) {
        pitching.set(stat, value);
    }
    pitching
}

// ---------------------------------------------------------------------------
// Teams and league
// ---------------------------------------------------------------------------

/// Apply a `team` row to an existing team. The roster column is never
/// applied, numeric zeros are placeholders, and the record goes through the
/// wins + losses <= games played check.
pub fn apply_team_row(team: &mut Team, row: &Row) -> Result<(), StatError> {
    if let Some(name) = text(row, "name") {
        team.name = name;
    }
    if let Some(manager) = text(row, "manager") {
        team.manager = Some(manager);
    }
    if let Some(league) = text(row, "league") {
        team.league_name = Some(league);
    }
    if let Some(id) = field_id(row.get("leagueID")) {
        team.league_id = Some(id);
    }
    for (column, target) in [("lineup", &mut team.lineup), ("positions", &mut team.positions)] {
        if let Some(entries) = row.get(column).and_then(Field::as_text).and_then(decode_map) {
            target.extend(entries);
        }
    }
    if let Some(max) = numeric(row, "max_roster") {
        team.set_max_roster(usize::try_from(max).ok());
    }
    team.set_record(
        numeric(row, "wins"),
        numeric(row, "losses"),
        numeric(row, "games_played"),
    )
}

/// Non-placeholder integer value of a column.
fn numeric(row: &Row, column: &str) -> Option<i64> {
    let raw = row.get(column)?.as_text()?;
    if coerce::is_zero_placeholder(raw) {
        None
    } else {
        Some(coerce::to_int(raw))
    }
}

/// Build a team from a `team` row. The id comes from `teamID` when it
/// normalizes, otherwise from the name.
pub fn team_from_row(row: &Row) -> (Team, Result<(), StatError>) {
    let name = text(row, "name").unwrap_or_default();
    let mut team = Team::new(name);
    if let Some(id) = field_id(row.get("teamID")) {
        team.id = id;
    }
    let record = apply_team_row(&mut team, row);
    (team, record)
}

/// Apply every non-null, non-empty admin column of a `league` row.
pub fn apply_league_row(admin: &mut LeagueAdmin, row: &Row) -> usize {
    LeagueAdmin::FIELDS
        .iter()
        .filter(|column| match text(row, column) {
            Some(value) => admin.set(column, value),
            None => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Field::parse(v)))
            .collect()
    }

    #[test]
    fn player_row_maps_counters_and_identity() {
        let r = row(&[
            ("playerID", "50"),
            ("name", "Ann Lee"),
            ("teamID", "5.0"),
            ("positions", r#"["catcher"]"#),
            ("hit", "2"),
            ("at_bat", "5"),
            ("AVG", "0.999"),
        ]);
        let p = player_from_row(&r);
        assert_eq!(p.id, 50);
        assert_eq!(p.team_id, Some(5));
        assert_eq!(p.positions, vec!["catcher"]);
        assert_eq!(p.batting.hit, 2);
        assert_eq!(p.rates.avg.to_string(), "0.400");
    }

    #[test]
    fn null_counters_are_not_deltas() {
        let r = row(&[("hit", "__SQL_NULL__"), ("bb", "3")]);
        assert_eq!(batting_counts(&r), vec![(BattingStat::Walks, 3)]);
    }

    #[test]
    fn pitching_counts_keep_fractional_innings() {
        let r = row(&[("ip", "6.2"), ("wins", "1.0"), ("games_played", "2")]);
        let counts = pitching_counts(&r);
        assert_eq!(counts[0], (PitchingStat::GamesPlayed, 2.0));
        assert!(counts.contains(&(PitchingStat::InningsPitched, 6.2)));
        assert!(counts.contains(&(PitchingStat::Wins, 1.0)));
    }

    #[test]
    fn team_row_skips_zero_placeholders() {
        let mut team = Team::new("Hawks");
        team.set_record(Some(3), Some(1), Some(5)).unwrap();
        let r = row(&[("wins", "0"), ("games_played", "6"), ("manager", "Sam")]);
        apply_team_row(&mut team, &r).unwrap();
        assert_eq!(team.wins, 3);
        assert_eq!(team.games_played, 6);
        assert_eq!(team.manager.as_deref(), Some("Sam"));
    }

    #[test]
    fn team_row_decodes_json_maps() {
        let r = row(&[
            ("teamID", "5"),
            ("name", "Hawks"),
            ("lineup", r#"{"1": "Ann Lee"}"#),
            ("positions", r#"{"catcher": "Ann Lee"}"#),
            ("players", r#"["Ann Lee"]"#),
        ]);
        let (team, record) = team_from_row(&r);
        assert!(record.is_ok());
        assert_eq!(team.id, 5);
        assert_eq!(team.lineup.get("1").map(String::as_str), Some("Ann Lee"));
        assert_eq!(team.positions.get("catcher").map(String::as_str), Some("Ann Lee"));
        assert!(team.roster.is_empty());
    }

    #[test]
    fn league_row_ignores_nulls_and_blanks() {
        let mut admin = LeagueAdmin {
            name: "League".into(),
            historian: Some("Kim".into()),
            ..LeagueAdmin::default()
        };
        let r = row(&[
            ("leagueID", "1"),
            ("name", "Riverside"),
            ("historian", "__SQL_NULL__"),
            ("treasurer", ""),
        ]);
        assert_eq!(apply_league_row(&mut admin, &r), 1);
        assert_eq!(admin.name, "Riverside");
        assert_eq!(admin.historian.as_deref(), Some("Kim"));
        assert_eq!(admin.treasurer, None);
    }
}
