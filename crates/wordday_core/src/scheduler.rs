//! Background trigger for the daily assignment job.
//!
//! # Responsibility
//! - Sleep until a fixed UTC wall-clock time, then invoke an injected job.
//! - Run the ensure-assignment job for every pool without ever propagating
//!   failures to the trigger.
//!
//! # Invariants
//! - The scheduler owns no pool state; it only calls the job with a date.
//! - Stopping the handle joins the thread before returning.
//! - Firing more than once per day is harmless: the job is idempotent.

use crate::db::open_db;
use crate::model::pool::Pool;
use crate::model::word::Assignment;
use crate::repo::word_repo::SqlitePoolRepository;
use crate::service::daily_word_service::{today_utc, DailyWordService, ServiceError};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SCHEDULER_THREAD_NAME: &str = "wordday-scheduler";

enum Command {
    RunNow,
    Shutdown,
}

/// Returns the first instant strictly after `now` whose UTC time is `at`.
pub fn next_fire_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let candidate = now.date_naive().and_time(at).and_utc();
    if candidate > now {
        candidate
    } else {
        candidate + TimeDelta::days(1)
    }
}

/// Handle to a running daily scheduler thread.
///
/// Dropping the handle stops the scheduler.
pub struct SchedulerHandle {
    sender: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Fires the job immediately for today's UTC date.
    ///
    /// Returns `false` when the scheduler thread is no longer running.
    pub fn run_now(&self) -> bool {
        self.sender.send(Command::RunNow).is_ok()
    }

    /// Stops the scheduler and waits for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    /// Blocks until the scheduler thread exits.
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("event=scheduler_stop module=scheduler status=error error=thread_panicked");
            }
        }
    }

    fn stop_and_join(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("event=scheduler_stop module=scheduler status=error error=thread_panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Daily trigger firing once per day at a fixed UTC time.
pub struct DailyScheduler;

impl DailyScheduler {
    /// Spawns the scheduler thread.
    ///
    /// `job` receives the UTC date it fires for.
    pub fn start<F>(at: NaiveTime, job: F) -> std::io::Result<SchedulerHandle>
    where
        F: FnMut(NaiveDate) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(SCHEDULER_THREAD_NAME.to_string())
            .spawn(move || run_loop(at, receiver, job))?;

        info!("event=scheduler_start module=scheduler status=ok at={at}");
        Ok(SchedulerHandle {
            sender,
            thread: Some(thread),
        })
    }
}

fn run_loop<F>(at: NaiveTime, receiver: mpsc::Receiver<Command>, mut job: F)
where
    F: FnMut(NaiveDate),
{
    loop {
        let now = Utc::now();
        let fire_at = next_fire_after(now, at);
        let wait = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
        info!("event=scheduler_wait module=scheduler status=ok next_fire={fire_at}");

        match receiver.recv_timeout(wait) {
            Ok(Command::RunNow) => job(today_utc()),
            Err(RecvTimeoutError::Timeout) => job(fire_at.date_naive()),
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("event=scheduler_stop module=scheduler status=ok");
}

/// Builds the job that ensures every pool has an assignment for the date.
///
/// Each firing opens its own connection to `db_path`.
pub fn daily_job(db_path: PathBuf) -> impl FnMut(NaiveDate) + Send + 'static {
    move |date| {
        for pool in Pool::ALL {
            run_daily_job(&db_path, pool, date);
        }
    }
}

/// Ensures `pool` has an assignment for `date`, logging instead of failing.
///
/// Returns the assignment when one exists after the call.
pub fn run_daily_job(db_path: &Path, pool: Pool, date: NaiveDate) -> Option<Assignment> {
    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=daily_job module=scheduler status=error pool={pool} date={date} error_code=db_open_failed error={err}"
            );
            return None;
        }
    };

    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, pool));
    match service.ensure_assignment(date) {
        Ok(assignment) => {
            info!(
                "event=daily_job module=scheduler status=ok pool={pool} date={date} word={}",
                assignment.word.text
            );
            Some(assignment)
        }
        Err(ServiceError::EmptyPool(_)) => {
            warn!("event=daily_job module=scheduler status=empty_pool pool={pool} date={date}");
            None
        }
        Err(err) => {
            error!(
                "event=daily_job module=scheduler status=error pool={pool} date={date} error={err}"
            );
            None
        }
    }
}
