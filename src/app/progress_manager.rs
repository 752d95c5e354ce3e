//! Progress UI (spinner) for harvest runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use notice_harvester::FetchStats;
use notice_harvester::progress::{estimate_remaining, format_hms};

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    stats: Arc<FetchStats>,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(stats, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(stats: Arc<FetchStats>, stop: Arc<AtomicBool>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        let mut fetch_started: Option<Instant> = None;
        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(status_message(&stats, &mut fetch_started));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

/// Spinner text: collection until the detail phase publishes its total.
fn status_message(stats: &FetchStats, fetch_started: &mut Option<Instant>) -> String {
    let total = stats.total();
    if total == 0 {
        return "Collecting tasks...".to_string();
    }
    let started = *fetch_started.get_or_insert_with(Instant::now);
    let done = stats.completed();
    let eta = estimate_remaining(started.elapsed(), done, total);
    format!(
        "[{}/{}] Fetching details ({} without detail), ETA {}",
        done.min(total),
        total,
        stats.detail_misses(),
        format_hms(eta)
    )
}

#[cfg(test)]
mod tests {
    use super::{spawn_progress_ui, status_message};
    use notice_harvester::FetchStats;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[test]
    fn status_message_reports_collection_before_fetch_starts() {
        let stats = FetchStats::new();
        let mut started = None;
        assert_eq!(status_message(&stats, &mut started), "Collecting tasks...");
        assert!(started.is_none());
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_disabled_returns_none_handle_and_stop_already_true() {
        let (handle, stop) = spawn_progress_ui(false, Arc::new(FetchStats::new()));

        assert!(handle.is_none());
        assert!(
            stop.load(Ordering::SeqCst),
            "stop signal should be true when spinner disabled"
        );
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_enabled_returns_handle_and_stop_ends_task() {
        let (handle, stop) = spawn_progress_ui(true, Arc::new(FetchStats::new()));

        assert!(handle.is_some(), "handle should be Some when spinner enabled");
        assert!(!stop.load(Ordering::SeqCst), "stop should be false initially");

        stop.store(true, Ordering::SeqCst);
        let _ = handle.unwrap().await;
    }
}
