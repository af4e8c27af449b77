//! Expiry sweeper: periodically deletes artifacts older than the retention
//! threshold.
//!
//! A pass lists the directory and handles every entry independently: a stat or
//! delete failure is logged and the pass moves on. Only a listing failure ends
//! a pass early, and even then the schedule keeps running. Nothing here locks
//! against the writer; fresh artifacts are safe because they are younger than
//! the threshold.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::config::RetentionPolicy;
use crate::core::expiry::{delay_until_next_boundary, is_expired};
use crate::error::SweepError;
use crate::io::artifact_dir::ArtifactDir;
use crate::io::clock::Clock;

/// Outcome of one sweep pass.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Entries listed in the directory.
    pub examined: usize,
    /// Entries deleted because they were past the threshold.
    pub removed: usize,
    /// Entries that could not be inspected or deleted.
    pub failed: Vec<SweepError>,
}

/// Run a single pass over `dir`.
///
/// Returns `Err` only when the directory cannot be listed. Per-entry failures
/// are collected in [`SweepReport::failed`].
#[instrument(skip_all, fields(dir = %dir.location().display()))]
pub fn sweep_once(
    dir: &dyn ArtifactDir,
    clock: &dyn Clock,
    max_age: Duration,
) -> Result<SweepReport, SweepError> {
    let entries = dir.list().map_err(|source| SweepError::Enumeration {
        dir: dir.location().to_path_buf(),
        source,
    })?;

    let now = clock.now();
    let mut report = SweepReport {
        examined: entries.len(),
        ..SweepReport::default()
    };

    for path in entries {
        let created = match dir.created(&path) {
            Ok(created) => created,
            Err(source) => {
                let err = SweepError::Entry { path, source };
                warn!(error = %err, "skipping artifact with unreadable creation time");
                report.failed.push(err);
                continue;
            }
        };

        if !is_expired(created, now, max_age) {
            continue;
        }

        match dir.remove(&path) {
            Ok(()) => {
                info!(path = %path.display(), "deleted expired artifact");
                report.removed += 1;
            }
            Err(source) => {
                let err = SweepError::Entry { path, source };
                warn!(error = %err, "failed to delete expired artifact");
                report.failed.push(err);
            }
        }
    }

    debug!(
        examined = report.examined,
        removed = report.removed,
        failed = report.failed.len(),
        "sweep pass finished"
    );
    Ok(report)
}

/// Recurring sweep over one artifact directory.
#[derive(Clone)]
pub struct Sweeper {
    dir: Arc<dyn ArtifactDir>,
    clock: Arc<dyn Clock>,
    policy: RetentionPolicy,
}

impl Sweeper {
    pub fn new(dir: Arc<dyn ArtifactDir>, clock: Arc<dyn Clock>, policy: RetentionPolicy) -> Self {
        Self { dir, clock, policy }
    }

    /// Run one pass on the blocking pool, logging instead of returning errors.
    pub async fn run_pass(&self) -> Option<SweepReport> {
        let dir = Arc::clone(&self.dir);
        let clock = Arc::clone(&self.clock);
        let max_age = self.policy.max_age;

        let joined =
            tokio::task::spawn_blocking(move || sweep_once(dir.as_ref(), clock.as_ref(), max_age))
                .await;

        match joined {
            Ok(Ok(report)) => Some(report),
            Ok(Err(err)) => {
                warn!(error = %err, "sweep pass aborted");
                None
            }
            Err(err) => {
                warn!(error = %err, "sweep pass panicked");
                None
            }
        }
    }

    /// Delay before the first pass, aligned to the next interval boundary.
    pub fn first_delay(&self, now: SystemTime) -> Duration {
        delay_until_next_boundary(now, self.policy.sweep_interval)
    }

    /// Spawn the recurring task.
    ///
    /// Passes run one after another inside this task, so they never overlap.
    /// If a pass overruns the interval, the missed ticks are skipped.
    pub fn spawn(self) -> JoinHandle<()> {
        self.spawn_with(|_| {})
    }

    /// Like [`Sweeper::spawn`], calling `on_pass` after every pass with its
    /// report (`None` when the pass was aborted).
    pub fn spawn_with<F>(self, mut on_pass: F) -> JoinHandle<()>
    where
        F: FnMut(Option<SweepReport>) + Send + 'static,
    {
        tokio::spawn(async move {
            let interval = self.policy.sweep_interval;
            let start = Instant::now() + self.first_delay(self.clock.now());
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                dir = %self.dir.location().display(),
                interval_secs = interval.as_secs(),
                max_age_secs = self.policy.max_age.as_secs(),
                "sweeper started"
            );

            loop {
                ticker.tick().await;
                on_pass(self.run_pass().await);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeClock, ScriptedDir};
    use std::io;
    use std::path::PathBuf;
    use std::time::UNIX_EPOCH;

    const MAX_AGE: Duration = Duration::from_secs(30 * 60);

    fn t0() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn deletes_only_entries_past_threshold() {
        let dir = ScriptedDir::new();
        dir.add("old.csv", t0());
        dir.add("edge.csv", t0() + Duration::from_secs(60));
        dir.add("fresh.csv", t0() + Duration::from_secs(25 * 60));
        let clock = FakeClock::new(t0() + MAX_AGE + Duration::from_secs(30));

        let report = sweep_once(&dir, &clock, MAX_AGE).expect("sweep");

        assert_eq!(report.examined, 3);
        assert_eq!(report.removed, 1);
        assert!(report.failed.is_empty());
        assert_eq!(dir.names(), vec!["edge.csv", "fresh.csv"]);
    }

    #[test]
    fn stat_and_delete_failures_do_not_stop_the_pass() {
        let dir = ScriptedDir::new();
        dir.add("a.csv", t0());
        dir.add("unstatable.csv", t0());
        dir.add("undeletable.csv", t0());
        dir.add("b.csv", t0());
        dir.fail_created("unstatable.csv");
        dir.fail_remove("undeletable.csv");
        let clock = FakeClock::new(t0() + Duration::from_secs(3600));

        let report = sweep_once(&dir, &clock, MAX_AGE).expect("sweep");

        assert_eq!(report.examined, 4);
        assert_eq!(report.removed, 2);
        assert_eq!(report.failed.len(), 2);
        let failed: Vec<PathBuf> = report
            .failed
            .iter()
            .map(|err| match err {
                SweepError::Entry { path, .. } => path.clone(),
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert!(failed.contains(&PathBuf::from("unstatable.csv")));
        assert!(failed.contains(&PathBuf::from("undeletable.csv")));
        assert_eq!(dir.names(), vec!["undeletable.csv", "unstatable.csv"]);
    }

    #[test]
    fn listing_failure_aborts_pass() {
        let dir = ScriptedDir::new();
        dir.add("a.csv", t0());
        dir.fail_list(io::ErrorKind::PermissionDenied);
        let clock = FakeClock::new(t0() + Duration::from_secs(3600));

        let err = sweep_once(&dir, &clock, MAX_AGE).expect_err("list fails");
        assert!(matches!(err, SweepError::Enumeration { .. }));
        assert_eq!(dir.names(), vec!["a.csv"]);
    }

    #[tokio::test]
    async fn run_pass_swallows_listing_failure() {
        let dir = Arc::new(ScriptedDir::new());
        dir.fail_list(io::ErrorKind::NotFound);
        let sweeper = Sweeper::new(
            dir,
            Arc::new(FakeClock::new(t0())),
            RetentionPolicy::default(),
        );
        assert!(sweeper.run_pass().await.is_none());
    }

    #[test]
    fn first_delay_aligns_to_interval() {
        let sweeper = Sweeper::new(
            Arc::new(ScriptedDir::new()),
            Arc::new(FakeClock::new(t0())),
            RetentionPolicy::default(),
        );
        // 1_700_000_000 % 1800 == 800
        assert_eq!(sweeper.first_delay(t0()), Duration::from_secs(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_sweeps_on_each_interval() {
        // 1_700_000_120 % 1800 == 920, so the first pass is 880s away.
        let now = t0() + Duration::from_secs(120);
        let dir = Arc::new(ScriptedDir::new());
        let clock = Arc::new(FakeClock::new(now));
        dir.add("first.csv", t0());
        let policy = RetentionPolicy {
            max_age: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(1800),
        };
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = Sweeper::new(dir.clone(), clock.clone(), policy).spawn_with(move |report| {
            let _ = tx.send(report.map(|r| r.removed));
        });

        tokio::time::sleep(Duration::from_secs(870)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(dir.names(), vec!["first.csv"]);

        let start = tokio::time::Instant::now();
        assert_eq!(rx.recv().await.expect("first pass"), Some(1));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert!(dir.names().is_empty());

        dir.add("second.csv", t0());
        assert_eq!(rx.recv().await.expect("second pass"), Some(1));
        assert_eq!(start.elapsed(), Duration::from_secs(10 + 1800));
        assert!(dir.names().is_empty());

        handle.abort();
    }
}
