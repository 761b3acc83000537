use chrono::NaiveDate;
use wordday_core::db::open_db_in_memory;
use wordday_core::{
    today_utc, AssignmentRepository, DailyWordService, Pool, ServiceError, SqlitePoolRepository,
    WordRepository,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn ensure_assignment_creates_once_then_returns_same_row() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["zeta"]).unwrap();
    let day = date("2024-01-01");
    assert!(service.assignment_for(day).unwrap().is_none());

    let first = service.ensure_assignment(day).unwrap();
    assert_eq!(first.date, day);
    assert_eq!(first.word.text, "zeta");
    assert!(first.word.used);
    assert_eq!(first.word.used_at, Some(day));

    let second = service.ensure_assignment(day).unwrap();
    assert_eq!(second, first);

    let stats = service.stats(10).unwrap();
    assert_eq!(stats.used, 1);
    assert_eq!(stats.unused, 0);
    assert_eq!(service.assignment_for(day).unwrap(), Some(first));
}

#[test]
fn repeated_ensure_consumes_no_additional_words() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["one", "two", "three"]).unwrap();
    let day = date("2024-06-15");

    let first = service.ensure_assignment(day).unwrap();
    for _ in 0..5 {
        assert_eq!(service.ensure_assignment(day).unwrap(), first);
    }
    assert_eq!(service.stats(10).unwrap().used, 1);
}

#[test]
fn ensure_on_exhausted_pool_leaves_date_unassigned() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["only"]).unwrap();
    service.ensure_assignment(date("2024-01-01")).unwrap();

    let err = service.ensure_assignment(date("2024-01-02")).unwrap_err();
    assert!(matches!(err, ServiceError::EmptyPool(Pool::English)));
    assert!(service.assignment_for(date("2024-01-02")).unwrap().is_none());

    // A refill makes the next attempt succeed.
    service.import_lines(["refill"]).unwrap();
    let assignment = service.ensure_assignment(date("2024-01-02")).unwrap();
    assert_eq!(assignment.word.text, "refill");
}

#[test]
fn each_date_gets_a_distinct_word() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::Hebrew));
    service.import_lines(["אחד", "שניים", "שלושה"]).unwrap();

    let a = service.ensure_assignment(date("2024-01-01")).unwrap();
    let b = service.ensure_assignment(date("2024-01-02")).unwrap();
    let c = service.ensure_assignment(date("2024-01-03")).unwrap();
    assert_ne!(a.word.id, b.word.id);
    assert_ne!(b.word.id, c.word.id);
    assert_ne!(a.word.id, c.word.id);
}

#[test]
fn choose_today_matches_today_assignment() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["alpha", "beta"]).unwrap();
    assert!(service.today_assignment().unwrap().is_none());

    let chosen = service.choose_today().unwrap();
    assert_eq!(chosen.date, today_utc());
    assert_eq!(service.today_assignment().unwrap(), Some(chosen.clone()));
    assert_eq!(service.choose_today().unwrap(), chosen);
}

#[test]
fn reassign_replaces_row_and_keeps_old_word_consumed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePoolRepository::new(&conn, Pool::English);
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["first", "second"]).unwrap();
    let day = date("2024-02-02");

    let original = service.ensure_assignment(day).unwrap();
    let replaced = service.reassign(day).unwrap();
    assert_ne!(original.word.id, replaced.word.id);
    assert_eq!(service.assignment_for(day).unwrap(), Some(replaced.clone()));
    assert_eq!(repo.recent_assignments(10).unwrap().len(), 1);

    let stats = service.stats(10).unwrap();
    assert_eq!(stats.used, 2);

    let err = service.reassign(day).unwrap_err();
    assert!(matches!(err, ServiceError::EmptyPool(Pool::English)));
    assert_eq!(service.assignment_for(day).unwrap(), Some(replaced));
}

#[test]
fn stats_lists_recent_history_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service
        .import_lines(["a", "b", "c", "d", "e"])
        .unwrap();
    for day in ["2024-01-03", "2024-01-01", "2024-01-04", "2024-01-02"] {
        service.ensure_assignment(date(day)).unwrap();
    }

    let stats = service.stats(3).unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.used, 4);
    assert_eq!(stats.unused, 1);
    let dates = stats.history.iter().map(|entry| entry.date).collect::<Vec<_>>();
    assert_eq!(
        dates,
        vec![date("2024-01-04"), date("2024-01-03"), date("2024-01-02")]
    );

    assert!(service.stats(0).unwrap().history.is_empty());
}

#[test]
fn stats_serialize_as_json_object() {
    let conn = open_db_in_memory().unwrap();
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["zeta"]).unwrap();
    service.ensure_assignment(date("2024-01-01")).unwrap();

    let json = serde_json::to_value(service.stats(10).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "total": 1,
            "used": 1,
            "unused": 0,
            "last_10_days": [{"date": "2024-01-01", "word": "zeta"}]
        })
    );
}

#[test]
fn failed_ledger_write_rolls_back_consumption() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePoolRepository::new(&conn, Pool::English);
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English));
    service.import_lines(["alpha", "beta"]).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_daily_words BEFORE INSERT ON daily_words
         BEGIN
             SELECT RAISE(ABORT, 'ledger write rejected');
         END;",
    )
    .unwrap();
    let day = date("2024-04-01");

    let err = service.ensure_assignment(day).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert!(err.to_string().contains("ledger write rejected"));
    assert!(conn.is_autocommit(), "transaction must be released on failure");

    assert_eq!(repo.counts().unwrap().used, 0);
    assert!(repo.get_assignment(day).unwrap().is_none());
}
