//! Progress arithmetic shared by the collection and fetch stages.

use std::time::Duration;

/// Linear ETA: average time per finished unit times the units left.
#[must_use]
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    let remaining = u32::try_from(total - done).unwrap_or(u32::MAX);
    let done = u32::try_from(done).unwrap_or(u32::MAX);
    (elapsed / done).saturating_mul(remaining)
}

/// Formats a duration as `H:MM:SS`, truncating sub-second precision.
#[must_use]
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
