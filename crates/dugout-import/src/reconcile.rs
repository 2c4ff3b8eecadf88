// Graph reconciler: folds the rows touched by an import into the in-memory
// league so it mirrors the store.
//
// Stages run in a fixed order (league, team, player, pitcher) because each
// stage resolves against entities created by the one before.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use dugout_core::coerce::field_id;
use dugout_core::{Field, Row, TableKind};
use dugout_league::mapping::{
    apply_league_row, apply_player_identity, apply_team_row, batting_counts, pitching_counts,
    pitching_from_row, player_from_row, team_from_row,
};
use dugout_league::{League, Pitcher, Pitching, Player, Rostered, StatError, Team};

use crate::assets::migrate_asset_path;
use crate::loader::{MergeStrategy, RowBatch};

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A player or pitcher row named a team that does not exist.
    Resolution,
    /// A merge delta was rejected by an entity invariant.
    Invariant,
    /// A new roster entry did not fit.
    RosterFull,
    /// Derived statistics could not be written back.
    Persist,
}

/// A non-fatal problem met while reconciling or persisting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeWarning {
    pub kind: WarningKind,
    pub entity: String,
    pub stat: Option<&'static str>,
    pub reason: String,
}

impl MergeWarning {
    pub fn new(kind: WarningKind, entity: impl Into<String>, reason: impl Into<String>) -> Self {
        MergeWarning {
            kind,
            entity: entity.into(),
            stat: None,
            reason: reason.into(),
        }
    }

    fn invariant(entity: &str, err: &StatError) -> Self {
        MergeWarning {
            kind: WarningKind::Invariant,
            entity: entity.to_string(),
            stat: Some(err.stat()),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.reason)
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub strategy: MergeStrategy,
    pub images_dir: PathBuf,
    /// Roster cap for new teams whose rows do not set one.
    pub default_max_roster: Option<usize>,
}

/// Fold every row of `batch` into `league`, then recompute all derived
/// statistics. Returns the warnings collected along the way.
pub fn reconcile(league: &mut League, batch: &RowBatch, options: &ReconcileOptions) -> Vec<MergeWarning> {
    let mut reconciler = Reconciler {
        league,
        options,
        warnings: Vec::new(),
    };
    for kind in TableKind::ALL {
        let rows = batch.rows(kind);
        if !rows.is_empty() {
            debug!("reconciling {} {kind} rows", rows.len());
        }
        for row in rows {
            match kind {
                TableKind::League => reconciler.league_row(row),
                TableKind::Team => reconciler.team_row(row),
                TableKind::Player => reconciler.player_row(row),
                TableKind::Pitcher => reconciler.pitcher_row(row),
            }
        }
    }
    reconciler.league.recompute_all();
    info!(
        "reconciled {} rows into {} teams / {} players ({} warnings)",
        batch.len(),
        reconciler.league.teams.len(),
        reconciler.league.player_count(),
        reconciler.warnings.len()
    );
    reconciler.warnings
}

struct Reconciler<'a> {
    league: &'a mut League,
    options: &'a ReconcileOptions,
    warnings: Vec<MergeWarning>,
}

impl Reconciler<'_> {
    fn merging(&self) -> bool {
        self.options.strategy == MergeStrategy::Merge
    }

    fn images_dir(&self) -> &Path {
        &self.options.images_dir
    }

    fn warn(&mut self, warning: MergeWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    // -----------------------------------------------------------------------
    // League
    // -----------------------------------------------------------------------

    fn league_row(&mut self, row: &Row) {
        if let Some(id) = field_id(row.get("leagueID")) {
            self.league.id = id;
        }
        let applied = apply_league_row(&mut self.league.admin, row);
        debug!("applied {applied} league fields");
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    fn team_row(&mut self, row: &Row) {
        let id = field_id(row.get("teamID"));
        let name = row.get("name").and_then(Field::non_empty);
        let logo = row
            .get("logo")
            .and_then(Field::as_text)
            .and_then(|raw| migrate_asset_path(raw, self.images_dir()));

        let existing = id
            .and_then(|id| self.league.team_index_by_id(id))
            .or_else(|| name.and_then(|n| self.league.team_index_by_name(n)));

        let (index, record) = match existing {
            Some(index) => {
                let team = &mut self.league.teams[index];
                if let Some(id) = id {
                    team.id = id;
                }
                (index, apply_team_row(team, row))
            }
            None => {
                let (mut team, record) = team_from_row(row);
                if team.max_roster.is_none() {
                    team.set_max_roster(self.options.default_max_roster);
                }
                (self.league.add_team(team), record)
            }
        };

        let team = &mut self.league.teams[index];
        if logo.is_some() {
            team.logo = logo;
        }
        let team_name = team.name.clone();
        if let Err(e) = record {
            self.warn(MergeWarning::invariant(&team_name, &e));
        }
    }

    /// Team index by name first, then by id.
    fn resolve_team(&self, name: Option<&str>, id: Option<i64>) -> Option<usize> {
        name.and_then(|n| self.league.team_index_by_name(n))
            .or_else(|| id.and_then(|id| self.league.team_index_by_id(id)))
    }

    fn unresolved(&mut self, what: &str, entity: &str, team_name: Option<&str>, team_id: Option<i64>) {
        let wanted = match (team_name, team_id) {
            (Some(n), Some(id)) => format!("team '{n}' / id {id}"),
            (Some(n), None) => format!("team '{n}'"),
            (None, Some(id)) => format!("team id {id}"),
            (None, None) => "no team reference".to_string(),
        };
        self.warn(MergeWarning::new(
            WarningKind::Resolution,
            entity,
            format!("{what} skipped: {wanted} not found"),
        ));
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    fn player_row(&mut self, row: &Row) {
        let mut candidate = player_from_row(row);
        candidate.image = row
            .get("image")
            .and_then(Field::as_text)
            .and_then(|raw| migrate_asset_path(raw, self.images_dir()));
        let captured_id = field_id(row.get("playerID"));
        let team_name = row.get("team").and_then(Field::non_empty);
        let team_id = field_id(row.get("teamID"));

        let Some(ti) = self.resolve_team(team_name, team_id) else {
            self.unresolved("player", &candidate.name, team_name, team_id);
            return;
        };
        let merging = self.merging();
        let league_id = self.league.id;
        let team = &mut self.league.teams[ti];
        attach_to(&mut candidate, team, league_id);
        let wants_pitcher = candidate.plays("pitcher");

        let existing = match captured_id {
            Some(id) => team.position_of_id(id),
            None => team.position_of_name(&candidate.name),
        };

        let Some(pi) = existing else {
            let name = candidate.name.clone();
            let entry = if wants_pitcher {
                Rostered::Pitcher(Pitcher::promote(candidate, Pitching::default()))
            } else {
                Rostered::Batter(candidate)
            };
            if !team.add(entry) {
                let reason = format!("not added to '{}': roster full or id taken", team.name);
                self.warn(MergeWarning::new(WarningKind::RosterFull, name, reason));
            }
            return;
        };

        let mut rejected = Vec::new();
        {
            let was_pitcher = team.roster[pi].pitcher().is_some();
            let player = team.roster[pi].player_mut();
            apply_player_identity(player, row);
            if was_pitcher {
                player.add_position("pitcher");
            }
            player.team_id = candidate.team_id;
            player.team_name = candidate.team_name.clone();
            player.league_id = candidate.league_id;
            if candidate.image.is_some() {
                player.image = candidate.image.clone();
            }
            if merging {
                for (stat, delta) in batting_counts(row) {
                    if let Err(e) = player.apply(stat, delta) {
                        rejected.push(MergeWarning::invariant(&player.name, &e));
                    }
                }
            } else {
                player.batting = candidate.batting.clone();
            }
        }
        if wants_pitcher && team.roster[pi].pitcher().is_none() {
            team.promote_at(pi, Pitching::default());
        }
        team.roster[pi].recompute();
        for warning in rejected {
            self.warn(warning);
        }
    }

    // -----------------------------------------------------------------------
    // Pitchers
    // -----------------------------------------------------------------------

    fn pitcher_row(&mut self, row: &Row) {
        let captured_id = field_id(row.get("playerID"));
        let name = row
            .get("name")
            .and_then(Field::non_empty)
            .unwrap_or_default()
            .to_string();

        let team_name = row.get("team").and_then(Field::non_empty);
        let team_id = field_id(row.get("teamID"));
        let Some(ti) = self.resolve_team(team_name, team_id) else {
            self.unresolved("pitcher", &name, team_name, team_id);
            return;
        };

        // Without an id, a same-named pitcher on the team is the same person.
        let team = &self.league.teams[ti];
        let existing = match captured_id {
            Some(id) => team.position_of_id(id),
            None => team
                .position_of_name(&name)
                .filter(|&pi| team.roster[pi].pitcher().is_some()),
        };
        if let Some(pi) = existing {
            self.merge_pitcher(ti, pi, row);
            return;
        }

        let league_id = self.league.id;
        let team = &mut self.league.teams[ti];
        let mut player = player_from_row(row);
        attach_to(&mut player, team, league_id);
        let mut pitcher = Pitcher::promote(player, pitching_from_row(row));
        pitcher.recompute();
        if !team.add(Rostered::Pitcher(pitcher)) {
            let reason = format!("not added to '{}': roster full or id taken", team.name);
            self.warn(MergeWarning::new(WarningKind::RosterFull, name, reason));
        }
    }

    /// Fold a pitcher row into the roster entry at (`ti`, `pi`), promoting a
    /// batter in place.
    fn merge_pitcher(&mut self, ti: usize, pi: usize, row: &Row) {
        let merging = self.merging();
        let team = &mut self.league.teams[ti];
        let entry = &team.roster[pi];

        let mut rejected = Vec::new();
        let pitching = if merging {
            let mut line = entry
                .pitcher()
                .map(|p| p.pitching.clone())
                .unwrap_or_default();
            for (stat, delta) in pitching_counts(row) {
                if let Err(e) = line.apply(stat, delta) {
                    rejected.push(MergeWarning::invariant(entry.name(), &e));
                }
            }
            line
        } else {
            pitching_from_row(row)
        };

        team.promote_at(pi, pitching);
        if let Some(name) = row.get("name").and_then(Field::non_empty) {
            team.roster[pi].player_mut().name = name.to_string();
        }
        team.roster[pi].recompute();
        for warning in rejected {
            self.warn(warning);
        }
    }
}

fn attach_to(player: &mut Player, team: &Team, league_id: i64) {
    player.team_id = Some(team.id);
    player.team_name = Some(team.name.clone());
    player.league_id = Some(league_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dugout_league::BattingStat;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Field::parse(v)))
            .collect()
    }

    fn options(strategy: MergeStrategy) -> ReconcileOptions {
        ReconcileOptions {
            strategy,
            images_dir: PathBuf::from("/srv/images"),
            default_max_roster: None,
        }
    }

    fn batch(rows: Vec<(TableKind, Row)>) -> RowBatch {
        let mut b = RowBatch::default();
        for (kind, r) in rows {
            b.push(kind, r);
        }
        b
    }

    fn hawks_with_ann(hit: &str, at_bat: &str) -> RowBatch {
        batch(vec![
            (TableKind::Team, row(&[("teamID", "5"), ("name", "Hawks")])),
            (
                TableKind::Player,
                row(&[
                    ("playerID", "50"),
                    ("name", "Ann Lee"),
                    ("teamID", "5"),
                    ("positions", r#"["catcher"]"#),
                    ("hit", hit),
                    ("at_bat", at_bat),
                ]),
            ),
        ])
    }

    // ------------------------------------------------------------------
    // Teams and league
    // ------------------------------------------------------------------

    #[test]
    fn league_row_updates_admin() {
        let mut league = League::new("League");
        let b = batch(vec![(
            TableKind::League,
            row(&[("leagueID", "3"), ("name", "Riverside"), ("commissioner", "__SQL_NULL__")]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(league.name(), "Riverside");
        assert_eq!(league.id, 3);
        assert_eq!(league.admin.commissioner, None);
    }

    #[test]
    fn team_matched_by_name_when_id_differs() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(1));
        let b = batch(vec![(
            TableKind::Team,
            row(&[("teamID", "5"), ("name", " hawks "), ("manager", "Sam"), ("logo", "Saved/Images/h.png")]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(league.teams.len(), 1);
        let team = &league.teams[0];
        assert_eq!(team.id, 5);
        assert_eq!(team.manager.as_deref(), Some("Sam"));
        assert_eq!(team.logo.as_deref(), Some("/srv/images/h.png"));
    }

    #[test]
    fn team_record_violation_is_a_warning() {
        let mut league = League::new("League");
        let b = batch(vec![(
            TableKind::Team,
            row(&[("teamID", "5"), ("name", "Hawks"), ("wins", "4"), ("losses", "2"), ("games_played", "5")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Invariant);
        assert_eq!(league.teams.len(), 1);
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    #[test]
    fn new_player_joins_resolved_team() {
        let mut league = League::new("League");
        let warnings = reconcile(&mut league, &hawks_with_ann("2", "5"), &options(MergeStrategy::Overwrite));
        assert!(warnings.is_empty());
        let hawks = &league.teams[0];
        assert_eq!(hawks.roster.len(), 1);
        let ann = hawks.roster[0].player();
        assert_eq!(ann.rates.avg.to_string(), "0.400");
        assert_eq!(ann.team_id, Some(5));
        assert_eq!(ann.league_id, Some(league.id));
    }

    #[test]
    fn merge_applies_deltas_to_existing_player() {
        let mut league = League::new("League");
        reconcile(&mut league, &hawks_with_ann("2", "5"), &options(MergeStrategy::Overwrite));
        reconcile(&mut league, &hawks_with_ann("2", "5"), &options(MergeStrategy::Merge));
        let ann = league.teams[0].roster[0].player();
        assert_eq!(league.teams[0].roster.len(), 1);
        assert_eq!(ann.batting.hit, 4);
        assert_eq!(ann.batting.at_bat, 10);
        assert_eq!(ann.rates.avg.to_string(), "0.400");
    }

    #[test]
    fn merge_additivity_on_hits() {
        let mut league = League::new("League");
        reconcile(&mut league, &hawks_with_ann("10", "30"), &options(MergeStrategy::Overwrite));
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "50"), ("teamID", "5"), ("hit", "5"), ("at_bat", "10")]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Merge));
        let ann = league.teams[0].roster[0].player();
        assert_eq!(ann.batting.hit, 15);
        assert_eq!(ann.batting.at_bat, 40);
        assert_eq!(ann.rates.avg.to_string(), "0.375");
    }

    #[test]
    fn rejected_delta_warns_and_siblings_still_apply() {
        let mut league = League::new("League");
        reconcile(&mut league, &hawks_with_ann("2", "5"), &options(MergeStrategy::Overwrite));
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "50"), ("teamID", "5"), ("hit", "9"), ("bb", "2")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Merge));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].stat, Some("hit"));
        let ann = league.teams[0].roster[0].player();
        assert_eq!(ann.batting.hit, 2);
        assert_eq!(ann.batting.bb, 2);
    }

    #[test]
    fn player_with_unknown_team_is_skipped() {
        let mut league = League::new("League");
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "8"), ("name", "Drifter"), ("teamID", "99"), ("team", "Nobody")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Resolution);
        assert_eq!(league.player_count(), 0);
    }

    #[test]
    fn team_name_wins_over_team_id() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        league.add_team(Team::new("Owls").with_id(6));
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "8"), ("name", "Kit"), ("teamID", "5"), ("team", "owls")]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert!(league.teams[0].roster.is_empty());
        assert_eq!(league.teams[1].roster.len(), 1);
    }

    #[test]
    fn pitcher_tagged_player_row_creates_pitcher() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "9"), ("name", "Ace"), ("teamID", "5"), ("positions", r#"["pitcher"]"#)]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert!(league.teams[0].roster[0].pitcher().is_some());
    }

    #[test]
    fn pitcher_tagged_merge_row_promotes_existing_batter_in_place() {
        let mut league = League::new("League");
        let mut hawks = Team::new("Hawks").with_id(5);
        let mut two_way = Player::new("Two Way").with_id(7);
        two_way.set_counter(BattingStat::AtBats, 60);
        two_way.set_counter(BattingStat::Hits, 20);
        hawks.add(Rostered::Batter(Player::new("Lead").with_id(1)));
        hawks.add(Rostered::Batter(two_way));
        hawks.add(Rostered::Batter(Player::new("Tail").with_id(9)));
        league.add_team(hawks);

        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "7"), ("teamID", "5"), ("positions", r#"["shortstop","pitcher"]"#), ("hit", "1"), ("at_bat", "4")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Merge));
        assert!(warnings.is_empty(), "{warnings:?}");

        let roster = &league.teams[0].roster;
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[2].name(), "Tail");
        let pitcher = roster[1].pitcher().expect("promoted in place");
        assert_eq!(pitcher.player.id, 7);
        assert_eq!(pitcher.player.batting.hit, 21);
        assert_eq!(pitcher.player.batting.at_bat, 64);
        assert_eq!(pitcher.pitching, Pitching::default());
    }

    #[test]
    fn pitcher_keeps_pitcher_position_when_row_omits_it() {
        let mut league = League::new("League");
        let mut hawks = Team::new("Hawks").with_id(5);
        hawks.add(Rostered::Pitcher(Pitcher::promote(Player::new("Ace").with_id(9), Pitching::default())));
        league.add_team(hawks);

        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "9"), ("teamID", "5"), ("positions", r#"["outfield"]"#)]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Merge));

        let ace = &league.teams[0].roster[0];
        assert!(ace.pitcher().is_some());
        assert!(ace.player().plays("pitcher"));
        assert!(ace.player().plays("outfield"));
    }

    #[test]
    fn full_roster_warns() {
        let mut league = League::new("League");
        let mut hawks = Team::new("Hawks").with_id(5);
        hawks.set_max_roster(Some(1));
        hawks.add(Rostered::Batter(Player::new("Only").with_id(1)));
        league.add_team(hawks);
        let b = batch(vec![(
            TableKind::Player,
            row(&[("playerID", "2"), ("name", "Extra"), ("teamID", "5")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(warnings[0].kind, WarningKind::RosterFull);
        assert_eq!(league.teams[0].roster.len(), 1);
    }

    // ------------------------------------------------------------------
    // Pitchers
    // ------------------------------------------------------------------

    #[test]
    fn pitcher_row_promotes_batter_and_keeps_offense() {
        let mut league = League::new("League");
        let mut hawks = Team::new("Hawks").with_id(5);
        let mut two_way = Player::new("Two Way").with_id(7);
        two_way.set_counter(BattingStat::AtBats, 60);
        two_way.set_counter(BattingStat::Hits, 20);
        hawks.add(Rostered::Batter(Player::new("Lead").with_id(1)));
        hawks.add(Rostered::Batter(two_way));
        league.add_team(hawks);

        let b = batch(vec![(
            TableKind::Pitcher,
            row(&[("playerID", "7"), ("teamID", "5"), ("games_played", "2"), ("wins", "1"), ("p_at_bats", "30"), ("ip", "9"), ("er", "3")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Merge));
        assert!(warnings.is_empty(), "{warnings:?}");

        let entry = &league.teams[0].roster[1];
        let pitcher = entry.pitcher().expect("promoted in place");
        assert_eq!(pitcher.player.batting.hit, 20);
        assert_eq!(pitcher.player.batting.at_bat, 60);
        assert_eq!(pitcher.pitching.wins, 1);
        assert_eq!(pitcher.rates.era.to_string(), "3.000");
        assert_eq!(pitcher.player.name, "Two Way");
    }

    #[test]
    fn pitcher_with_unknown_team_warns_once() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        let b = batch(vec![(
            TableKind::Pitcher,
            row(&[("playerID", "70"), ("name", "Stray"), ("teamID", "404"), ("games_played", "1")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Resolution);
        assert_eq!(league.player_count(), 0);
    }

    #[test]
    fn pitcher_id_on_another_team_does_not_resolve_the_row() {
        let mut league = League::new("League");
        let mut hawks = Team::new("Hawks").with_id(5);
        hawks.add(Rostered::Batter(Player::new("Two Way").with_id(7)));
        league.add_team(hawks);

        let b = batch(vec![(
            TableKind::Pitcher,
            row(&[("playerID", "7"), ("teamID", "404"), ("name", "Two Way"), ("games_played", "3"), ("wins", "1")]),
        )]);
        let warnings = reconcile(&mut league, &b, &options(MergeStrategy::Merge));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Resolution);
        assert!(league.teams[0].roster[0].pitcher().is_none());
    }

    #[test]
    fn pitcher_team_name_wins_over_team_id() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        league.add_team(Team::new("Owls").with_id(6));
        let b = batch(vec![(
            TableKind::Pitcher,
            row(&[("playerID", "70"), ("name", "Arm"), ("teamID", "5"), ("team", "Owls"), ("games_played", "1")]),
        )]);
        reconcile(&mut league, &b, &options(MergeStrategy::Overwrite));
        assert!(league.teams[0].roster.is_empty());
        assert_eq!(league.teams[1].roster.len(), 1);
    }

    #[test]
    fn pitcher_merge_order_lets_games_bound_wins() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        let first = batch(vec![(
            TableKind::Pitcher,
            row(&[("playerID", "70"), ("name", "Arm"), ("teamID", "5"), ("games_played", "1"), ("wins", "1")]),
        )]);
        reconcile(&mut league, &first, &options(MergeStrategy::Overwrite));
        // wins arrives before games_played in the row, but games apply first.
        let second = batch(vec![(
            TableKind::Pitcher,
            row(&[("wins", "1"), ("playerID", "70"), ("games_played", "1")]),
        )]);
        let warnings = reconcile(&mut league, &second, &options(MergeStrategy::Merge));
        assert!(warnings.is_empty(), "{warnings:?}");
        let arm = league.teams[0].roster[0].pitcher().unwrap();
        assert_eq!(arm.pitching.games_played, 2);
        assert_eq!(arm.pitching.wins, 2);
    }

    #[test]
    fn overwrite_replaces_pitching_line() {
        let mut league = League::new("League");
        league.add_team(Team::new("Hawks").with_id(5));
        let row1 = row(&[("playerID", "70"), ("name", "Arm"), ("teamID", "5"), ("games_played", "3"), ("saves", "2")]);
        let row2 = row(&[("playerID", "70"), ("teamID", "5"), ("games_played", "1")]);
        reconcile(&mut league, &batch(vec![(TableKind::Pitcher, row1)]), &options(MergeStrategy::Overwrite));
        reconcile(&mut league, &batch(vec![(TableKind::Pitcher, row2)]), &options(MergeStrategy::Overwrite));
        let arm = league.teams[0].roster[0].pitcher().unwrap();
        assert_eq!(arm.pitching.games_played, 1);
        assert_eq!(arm.pitching.saves, 0);
        assert_eq!(arm.player.name, "Arm");
    }
}
