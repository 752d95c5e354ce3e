//! End-to-end harvest: collect, enrich, emit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use crate::collect::{Collection, CollectionStats, TaskCollector};
use crate::config::{ConfigError, HarvestConfig};
use crate::fetch::{DetailFetchPool, FetchStats};
use crate::progress::format_hms;
use crate::record::FIELD_NAMES;
use crate::sink::{RecordSink, SinkError};
use crate::source::NoticeSource;

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Deduplicated tasks collected.
    pub tasks: usize,
    /// Tasks contributed by the global pass.
    pub global_tasks: usize,
    /// Records written to the sink.
    pub records: usize,
    /// Records merged with a detail.
    pub detail_hits: usize,
    /// Records emitted from summary fields only.
    pub detail_misses: usize,
    /// Workers that panicked.
    pub failed_workers: usize,
    /// Coverage counters from collection.
    pub collection: CollectionStats,
    /// Global pass wall time.
    pub global_duration: Duration,
    /// Facet pass wall time.
    pub facet_duration: Duration,
    /// Detail phase wall time.
    pub fetch_duration: Duration,
    /// Whole run wall time.
    pub total_duration: Duration,
}

impl RunReport {
    /// Records per minute over the whole run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn records_per_minute(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs * 60.0
        } else {
            0.0
        }
    }

    /// Records per hour over the whole run.
    #[must_use]
    pub fn records_per_hour(&self) -> f64 {
        self.records_per_minute() * 60.0
    }

    /// Logs the final report.
    pub fn log_summary(&self, output: &str) {
        info!(
            output,
            records = self.records,
            columns = FIELD_NAMES.len(),
            tasks = self.tasks,
            global_tasks = self.global_tasks,
            "harvest complete"
        );
        info!(
            global = %format_hms(self.global_duration),
            facets = %format_hms(self.facet_duration),
            details = %format_hms(self.fetch_duration),
            total = %format_hms(self.total_duration),
            per_minute = %format!("{:.1}", self.records_per_minute()),
            per_hour = %format!("{:.0}", self.records_per_hour()),
            "timings"
        );
        let c = &self.collection;
        info!(
            probes = c.probes,
            failed_probes = c.failed_probes,
            pages = c.pages,
            failed_pages = c.failed_pages,
            duplicates = c.duplicates,
            lossy_partitions = c.lossy_partitions,
            unreachable = c.unreachable,
            failed_facets = c.failed_facets,
            max_depth_reached = c.max_depth_reached,
            "coverage"
        );
        info!(
            detail_hits = self.detail_hits,
            detail_misses = self.detail_misses,
            failed_workers = self.failed_workers,
            "detail fetch"
        );
    }
}

/// Runs the collection and detail phases against one source.
pub struct Harvester {
    config: HarvestConfig,
    source: Arc<dyn NoticeSource>,
    collector: TaskCollector,
    pool: DetailFetchPool,
}

impl Harvester {
    /// Creates a harvester after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in `config`.
    pub fn new(config: HarvestConfig, source: Arc<dyn NoticeSource>) -> Result<Self, ConfigError> {
        let collector = TaskCollector::new(Arc::clone(&source), &config)?;
        let pool = DetailFetchPool::new(&config)?;
        Ok(Self {
            config,
            source,
            collector,
            pool,
        })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Live detail-phase counters.
    #[must_use]
    pub fn fetch_stats(&self) -> Arc<FetchStats> {
        self.pool.stats()
    }

    /// Runs collection only.
    pub async fn collect(&self, facet_universe: &[&str]) -> Collection {
        self.collector.collect(facet_universe).await
    }

    /// Collects, enriches, and writes every record to `sink`.
    ///
    /// # Errors
    ///
    /// Only sink failures abort the run; source failures are absorbed and
    /// reported in the returned [`RunReport`].
    #[instrument(skip(self, facet_universe, sink), fields(facets = facet_universe.len()))]
    pub async fn run(
        &self,
        facet_universe: &[&str],
        sink: &mut dyn RecordSink,
    ) -> Result<RunReport, SinkError> {
        let start = Instant::now();
        let collection = self.collect(facet_universe).await;
        let tasks = collection.tasks.len();

        let fetch_start = Instant::now();
        let records = self.pool.run(Arc::clone(&self.source), collection.tasks).await;
        let fetch_duration = fetch_start.elapsed();

        for record in &records {
            sink.emit(record)?;
        }
        sink.finish()?;

        let stats = self.pool.stats();
        Ok(RunReport {
            tasks,
            global_tasks: collection.global_tasks,
            records: records.len(),
            detail_hits: stats.detail_hits(),
            detail_misses: stats.detail_misses(),
            failed_workers: stats.failed(),
            collection: collection.stats,
            global_duration: collection.global_duration,
            facet_duration: collection.facet_duration,
            fetch_duration,
            total_duration: start.elapsed(),
        })
    }
}
