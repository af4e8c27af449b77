//! Expiry and schedule arithmetic over explicit timestamps.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Age of an artifact created at `created`, as seen at `now`.
///
/// Creation times in the future (clock skew, restored backups) count as age 0.
pub fn artifact_age(created: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(created).unwrap_or(Duration::ZERO)
}

/// An artifact is expired once its age is strictly greater than `max_age`.
pub fn is_expired(created: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    artifact_age(created, now) > max_age
}

/// Time from `now` until the next multiple of `interval` since the Unix epoch.
///
/// For a 30 minute interval this lands on :00 and :30 of every hour, like
/// `*/30 * * * *`. Exactly on a boundary, the next boundary is a full
/// interval away.
pub fn delay_until_next_boundary(now: SystemTime, interval: Duration) -> Duration {
    let interval_nanos = interval.as_nanos();
    if interval_nanos == 0 {
        return Duration::ZERO;
    }
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
    let into_period = since_epoch.as_nanos() % interval_nanos;
    let remaining = interval_nanos - into_period;
    Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX))
}
