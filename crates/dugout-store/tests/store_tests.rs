// Integration tests for the store: hydration, derived-stat persistence, and
// CSV export through the public API, using an on-disk database.

use dugout_core::{Field, Row, TableKind, NULL_SENTINEL};
use dugout_store::export::export_session_with_token;
use dugout_store::Database;

// ===========================================================================
// Test helpers
// ===========================================================================

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Field::parse(v)))
        .collect()
}

fn seeded(path: &str) -> Database {
    let db = Database::open(path).expect("database should open");
    db.with_table(TableKind::League, |t| {
        t.insert(&row(&[("leagueID", "1"), ("name", "Riverside"), ("historian", NULL_SENTINEL)]), false)
    })
    .unwrap();
    db.with_table(TableKind::Team, |t| {
        t.insert(
            &row(&[
                ("teamID", "5"),
                ("name", "Hawks"),
                ("leagueID", "1"),
                ("lineup", r#"{"1": "Ann Lee"}"#),
            ]),
            false,
        )
    })
    .unwrap();
    db.with_table(TableKind::Player, |t| {
        t.insert(
            &row(&[
                ("playerID", "50"),
                ("name", "Ann Lee"),
                ("teamID", "5"),
                ("positions", r#"["catcher"]"#),
                ("hit", "2"),
                ("at_bat", "5"),
                ("pa", "5"),
            ]),
            false,
        )
    })
    .unwrap();
    db
}

// ===========================================================================
// Persistence across reopen
// ===========================================================================

#[test]
fn derived_stats_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("dugout.db");
    let path = path.to_str().unwrap();

    {
        let db = seeded(path);
        let league = db.load_league("League").unwrap();
        assert!(db.persist_derived(&league).unwrap().is_empty());
    }

    let db = Database::open(path).unwrap();
    let stored = db.row(TableKind::Player, 50).unwrap().expect("player row");
    assert_eq!(stored.get("AVG"), Some(&Field::value("0.4")));

    let league = db.load_league("League").unwrap();
    assert_eq!(league.name(), "Riverside");
    assert_eq!(league.id, 1);
    let hawks = league.find_team("hawks").expect("Hawks should load");
    assert_eq!(hawks.lineup.get("1").map(String::as_str), Some("Ann Lee"));
    assert_eq!(hawks.roster.len(), 1);
}

// ===========================================================================
// Export
// ===========================================================================

#[test]
fn export_writes_sentinel_for_null_and_stored_values() {
    let tmp = tempfile::tempdir().unwrap();
    let db = seeded(":memory:");
    let out = tmp.path().join("exports");

    let report = export_session_with_token(&db, &out, "20261017090000").unwrap();
    assert_eq!(report.token, "20261017090000");

    let mut rdr = csv::Reader::from_path(out.join("league_20261017090000.csv")).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let record = rdr.records().next().unwrap().unwrap();
    let historian = headers.iter().position(|h| h == "historian").unwrap();
    assert_eq!(&record[historian], NULL_SENTINEL);

    let mut rdr = csv::Reader::from_path(out.join("player_20261017090000.csv")).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let record = rdr.records().next().unwrap().unwrap();
    let hit = headers.iter().position(|h| h == "hit").unwrap();
    assert_eq!(&record[hit], "2");
}

#[test]
fn second_export_in_same_second_is_a_separate_session() {
    let tmp = tempfile::tempdir().unwrap();
    let db = seeded(":memory:");
    let first = export_session_with_token(&db, tmp.path(), "7").unwrap();
    let second = export_session_with_token(&db, tmp.path(), "7").unwrap();
    assert_eq!(first.token, "7");
    assert_eq!(second.token, "7(1)");
    assert!(tmp.path().join("pitcher_7(1).csv").exists());
}
