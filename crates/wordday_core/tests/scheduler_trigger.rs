use chrono::NaiveTime;
use std::sync::mpsc;
use std::time::Duration;
use wordday_core::db::open_db;
use wordday_core::{
    daily_job, run_daily_job, today_utc, AssignmentRepository, DailyScheduler, DailyWordService,
    Pool, SqlitePoolRepository,
};

#[test]
fn run_now_invokes_job_with_today() {
    let (sender, receiver) = mpsc::channel();
    let handle = DailyScheduler::start(NaiveTime::MIN, move |date| {
        let _ = sender.send(date);
    })
    .unwrap();

    assert!(handle.run_now());
    let fired = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(fired, today_utc());

    handle.shutdown();
}

#[test]
fn shutdown_stops_scheduler_without_firing() {
    let (sender, receiver) = mpsc::channel::<chrono::NaiveDate>();
    let handle = DailyScheduler::start(NaiveTime::MIN, move |date| {
        let _ = sender.send(date);
    })
    .unwrap();

    handle.shutdown();
    assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn daily_job_assigns_every_pool_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");
    {
        let conn = open_db(&path).unwrap();
        DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::English))
            .import_lines(["alpha", "beta"])
            .unwrap();
        DailyWordService::new(SqlitePoolRepository::new(&conn, Pool::Hebrew))
            .import_lines(["אלף", "בית"])
            .unwrap();
    }

    let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let mut job = daily_job(path.clone());
    job(day);
    job(day);

    let conn = open_db(&path).unwrap();
    for pool in Pool::ALL {
        let repo = SqlitePoolRepository::new(&conn, pool);
        let assignment = repo.get_assignment(day).unwrap().unwrap();
        assert!(assignment.word.used);
        assert_eq!(repo.recent_assignments(10).unwrap().len(), 1);
    }
}

#[test]
fn run_daily_job_reports_empty_pool_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");
    let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    assert!(run_daily_job(&path, Pool::English, day).is_none());

    let conn = open_db(&path).unwrap();
    let repo = SqlitePoolRepository::new(&conn, Pool::English);
    assert!(repo.get_assignment(day).unwrap().is_none());
}
