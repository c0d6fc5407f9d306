use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{LeagueConfig, RetryConfig, ScheduleConfig};
use crate::error::{BotError, Result};
use crate::standings::StandingsReporter;
use crate::telemetry;

/// A weekday and wall-clock time in a named timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub time: NaiveTime,
    pub tz: Tz,
}

impl WeeklySchedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let weekday = config.weekday.trim().parse::<Weekday>().map_err(|_| {
            BotError::Config(format!("Invalid schedule weekday: {}", config.weekday))
        })?;
        let time = NaiveTime::parse_from_str(config.time.trim(), "%H:%M").map_err(|_| {
            BotError::Config(format!(
                "Invalid schedule time (expected HH:MM): {}",
                config.time
            ))
        })?;
        let tz = config.timezone.trim().parse::<Tz>().map_err(|_| {
            BotError::Config(format!(
                "Invalid timezone (expected an IANA name): {}",
                config.timezone
            ))
        })?;

        Ok(Self { weekday, time, tz })
    }

    /// Next fire instant strictly after `now`.
    ///
    /// The wall-clock time is resolved on each candidate date, so the UTC
    /// instant moves with daylight saving changes.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - today.weekday().num_days_from_monday())
            % 7;

        let mut date = today + chrono::Duration::days(i64::from(days_ahead));
        loop {
            if let Some(at) = self.fire_on(date) {
                if at > now {
                    return at;
                }
            }
            date += chrono::Duration::weeks(1);
        }
    }

    /// Fire instant on a local date. Ambiguous times take the earlier
    /// instant; times skipped by a spring-forward move one hour later.
    fn fire_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let local = date.and_time(self.time);
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(local + chrono::Duration::hours(1)))
                    .earliest()
            })
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Run an operation, retrying with exponential backoff
pub async fn run_with_retry<F, Fut, T, E>(
    mut f: F,
    retry_config: &RetryConfig,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = retry_config.max_retries.max(1);
    let max_delay = retry_config.max_delay_secs as f64;
    let mut delay = Duration::from_secs(retry_config.initial_delay_secs);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                sleep(delay).await;

                // Exponential backoff
                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * retry_config.backoff_multiplier)
                        .min(max_delay)
                        .max(0.0),
                );
                attempt += 1;
            }
        }
    }
}

/// Outcome of one pass over every configured league
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub posted: Vec<String>,
    /// League name and the error that stopped it
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    fn record(mut self, league: &LeagueConfig, outcome: Result<()>) -> Self {
        match outcome {
            Ok(()) => {
                info!(league = %league.name, "[OK] Posted standings");
                telemetry::record_post(true);
                self.posted.push(league.name.clone());
            }
            Err(e) => {
                error!(league = %league.name, "[FAIL] {}", e);
                telemetry::record_post(false);
                self.failed.push((league.name.clone(), e.to_string()));
            }
        }
        self
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Post season standings for each league in order, one at a time.
///
/// Fetching and rendering are retried; the post itself is sent once so a
/// slow channel never receives the table twice. A league that still fails
/// is recorded and the batch moves on to the next one.
pub async fn post_all_leagues(
    reporter: &StandingsReporter,
    leagues: &[LeagueConfig],
    retry: &RetryConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    for league in leagues {
        let outcome = match run_with_retry(|| reporter.prepare_standings(league), retry).await {
            Ok(message) => reporter.deliver_standings(league, message).await,
            Err(e) => Err(e),
        };
        report = report.record(league, outcome);
    }
    report
}

/// Once-per-process start guard for a background task
#[derive(Debug, Default)]
pub struct ScheduleGuard {
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScheduleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `start` on the first call only; returns whether it ran
    pub fn ensure_scheduled<F>(&self, start: F) -> bool
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let handle = start();
        if let Ok(mut task) = self.task.lock() {
            *task = Some(handle);
        }
        true
    }

    pub fn is_scheduled(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Abort the task, if one was started
    pub fn shutdown(&self) {
        if let Some(handle) = self.task.lock().ok().and_then(|mut task| task.take()) {
            handle.abort();
        }
    }
}

/// Weekly standings job for every configured league
pub struct WeeklyScheduler {
    schedule: WeeklySchedule,
    retry: RetryConfig,
    reporter: Arc<StandingsReporter>,
    leagues: Arc<Vec<LeagueConfig>>,
    guard: ScheduleGuard,
}

impl WeeklyScheduler {
    pub fn new(
        schedule: WeeklySchedule,
        retry: RetryConfig,
        reporter: Arc<StandingsReporter>,
        leagues: Arc<Vec<LeagueConfig>>,
    ) -> Self {
        Self {
            schedule,
            retry,
            reporter,
            leagues,
            guard: ScheduleGuard::new(),
        }
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    /// Start the weekly job unless it is already running
    pub fn ensure_scheduled(&self) -> bool {
        self.guard.ensure_scheduled(|| {
            let schedule = self.schedule;
            let retry = self.retry.clone();
            let reporter = Arc::clone(&self.reporter);
            let leagues = Arc::clone(&self.leagues);
            tokio::spawn(async move {
                run_weekly(schedule, retry, reporter, leagues).await;
            })
        })
    }

    pub fn is_scheduled(&self) -> bool {
        self.guard.is_scheduled()
    }

    pub fn shutdown(&self) {
        self.guard.shutdown();
    }
}

async fn run_weekly(
    schedule: WeeklySchedule,
    retry: RetryConfig,
    reporter: Arc<StandingsReporter>,
    leagues: Arc<Vec<LeagueConfig>>,
) {
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        info!(
            "Next standings post scheduled for: {}",
            next.with_timezone(&schedule.tz)
        );
        sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;

        info!(
            "Running weekly standings post for {} leagues",
            leagues.len()
        );
        let report = post_all_leagues(&reporter, &leagues, &retry).await;
        if report.is_clean() {
            info!(
                posted = report.posted.len(),
                "Weekly standings post complete"
            );
        } else {
            warn!(
                posted = report.posted.len(),
                failed = report.failed.len(),
                "Weekly standings post finished with failures"
            );
        }
    }
}
