//! Concurrent detail enrichment.
//!
//! The [`DetailFetchPool`] turns collected tasks into [`OutputRecord`]s. Each
//! task runs on its own tokio task behind a semaphore permit, fetches the
//! entity's detail record, and merges it with the summary. A failed detail
//! call never drops the entity: the record is emitted from summary fields
//! alone and counted as a detail miss.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use notice_harvester::{DetailFetchPool, HarvestConfig, HttpNoticeSource, NoticeSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::default();
//! let source: Arc<dyn NoticeSource> = Arc::new(HttpNoticeSource::new(&config)?);
//! let pool = DetailFetchPool::new(&config)?;
//! let records = pool.run(source, Vec::new()).await;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::collect::TaskRecord;
use crate::config::{ConfigError, HarvestConfig, MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::progress::{estimate_remaining, format_hms};
use crate::record::{OutputRecord, merge_record};
use crate::source::{DetailRef, NoticeSource};

/// Completions between two progress log lines.
const PROGRESS_LOG_INTERVAL: usize = 100;

/// Live counters for one fetch run, readable while workers are running.
#[derive(Debug, Default)]
pub struct FetchStats {
    total: AtomicUsize,
    completed: AtomicUsize,
    detail_hits: AtomicUsize,
    detail_misses: AtomicUsize,
    failed: AtomicUsize,
}

impl FetchStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks scheduled in the current run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Tasks that produced a record.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Records merged with a fetched detail.
    #[must_use]
    pub fn detail_hits(&self) -> usize {
        self.detail_hits.load(Ordering::SeqCst)
    }

    /// Records emitted from summary fields only.
    #[must_use]
    pub fn detail_misses(&self) -> usize {
        self.detail_misses.load(Ordering::SeqCst)
    }

    /// Worker tasks that panicked and produced no record.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    fn reset(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.detail_hits.store(0, Ordering::SeqCst);
        self.detail_misses.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
    }

    /// Records one completion and returns the new completed count.
    fn record_completion(&self, detail_found: bool) -> usize {
        if detail_found {
            self.detail_hits.fetch_add(1, Ordering::SeqCst);
        } else {
            self.detail_misses.fetch_add(1, Ordering::SeqCst);
        }
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fixed-size worker pool that enriches tasks with detail records.
#[derive(Debug)]
pub struct DetailFetchPool {
    concurrency: usize,
    detail_delay: Duration,
    stats: Arc<FetchStats>,
}

impl DetailFetchPool {
    /// Creates a pool from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] if the worker count is
    /// outside the valid range.
    #[instrument(level = "debug", skip(config), fields(concurrency = config.concurrency))]
    pub fn new(config: &HarvestConfig) -> Result<Self, ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&config.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: config.concurrency,
            });
        }
        debug!(
            detail_delay_ms = config.detail_delay.as_millis(),
            "creating detail fetch pool"
        );
        Ok(Self {
            concurrency: config.concurrency,
            detail_delay: config.detail_delay,
            stats: Arc::new(FetchStats::new()),
        })
    }

    /// Configured worker count.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Shared handle to the live counters, e.g. for a progress display.
    #[must_use]
    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    /// Fetches details for every task and returns the merged records in
    /// completion order.
    ///
    /// Never fails: each task yields exactly one record unless its worker
    /// panics, which is logged and counted in [`FetchStats::failed`].
    #[instrument(skip(self, source, tasks), fields(tasks = tasks.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        source: Arc<dyn NoticeSource>,
        tasks: Vec<TaskRecord>,
    ) -> Vec<OutputRecord> {
        let total = tasks.len();
        self.stats.reset(total);
        info!(total, "starting detail fetch");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let start = Instant::now();
        let mut workers = JoinSet::new();

        for task in tasks {
            // The semaphore is local and never closed.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let source = Arc::clone(&source);
            let stats = Arc::clone(&self.stats);
            let detail_delay = self.detail_delay;

            workers.spawn(async move {
                let _permit = permit;
                let entity = task.into_entity();

                let detail = match DetailRef::choose(&entity.detail_url, &entity.entity_id) {
                    Some(reference) => {
                        if !detail_delay.is_zero() {
                            tokio::time::sleep(detail_delay).await;
                        }
                        match source.fetch_detail(&reference).await {
                            Ok(detail) => Some(detail),
                            Err(error) => {
                                debug!(
                                    entity_id = %entity.entity_id,
                                    kind = error.kind(),
                                    error = %error,
                                    "detail unavailable; using summary only"
                                );
                                None
                            }
                        }
                    }
                    None => None,
                };

                let record = merge_record(&entity.summary, detail.as_ref());
                let done = stats.record_completion(detail.is_some());
                if done % PROGRESS_LOG_INTERVAL == 0 {
                    let eta = estimate_remaining(start.elapsed(), done, total);
                    info!(
                        progress = %format!("{done}/{total}"),
                        eta = %format_hms(eta),
                        "detail fetch progress"
                    );
                }
                record
            });
        }

        let mut records = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(record) => records.push(record),
                Err(error) => {
                    self.stats.increment_failed();
                    warn!(error = %error, "detail worker panicked");
                }
            }
        }

        info!(
            completed = self.stats.completed(),
            detail_hits = self.stats.detail_hits(),
            detail_misses = self.stats.detail_misses(),
            failed = self.stats.failed(),
            duration = %format_hms(start.elapsed()),
            "detail fetch complete"
        );
        records
    }
}
