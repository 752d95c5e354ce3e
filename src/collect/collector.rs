//! Two-pass task collection: global walk, then per-facet coverage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use super::paging::{admit_page, fetch_partition, probe};
use super::{
    CollectContext, CollectionStats, CoverageSplitter, Pacer, PartitionSettings, TaskRecord,
};
use crate::config::{ConfigError, HarvestConfig};
use crate::progress::{estimate_remaining, format_hms};
use crate::record::countries;
use crate::source::{AgeRange, FilterSpec, NoticeSource, Sex, SourceError};

/// Result of a collection run.
#[derive(Debug, Default)]
pub struct Collection {
    /// Deduplicated tasks in discovery order.
    pub tasks: Vec<TaskRecord>,
    /// Coverage counters.
    pub stats: CollectionStats,
    /// Tasks contributed by the global pass.
    pub global_tasks: usize,
    /// Wall time of the global pass.
    pub global_duration: Duration,
    /// Wall time of the facet pass.
    pub facet_duration: Duration,
}

/// Orchestrates the global pass and the facet pass over one source.
pub struct TaskCollector {
    source: Arc<dyn NoticeSource>,
    settings: PartitionSettings,
    global_page_ceiling: u32,
    max_pages: Option<u32>,
    task_cap: Option<usize>,
    delay: Duration,
}

impl TaskCollector {
    /// Creates a collector from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in `config`.
    pub fn new(source: Arc<dyn NoticeSource>, config: &HarvestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            settings: PartitionSettings::from(config),
            global_page_ceiling: config.global_page_ceiling,
            max_pages: config.max_pages,
            task_cap: config.task_cap(),
            delay: config.delay,
        })
    }

    /// Collects the deduplicated task list.
    ///
    /// Never fails: probe and page failures are skipped at the smallest
    /// enclosing unit and only show up in [`Collection::stats`].
    #[instrument(skip(self, facet_universe), fields(facets = facet_universe.len()))]
    pub async fn collect(&self, facet_universe: &[&str]) -> Collection {
        let mut ctx = CollectContext::new(Pacer::new(self.delay));
        let mut tasks = Vec::new();

        let global_start = Instant::now();
        self.global_pass(&mut ctx, &mut tasks).await;
        let global_duration = global_start.elapsed();
        let global_tasks = tasks.len();
        info!(
            tasks = global_tasks,
            duration = %format_hms(global_duration),
            "global pass complete"
        );

        let facet_start = Instant::now();
        self.facet_pass(facet_universe, &mut ctx, &mut tasks).await;
        let facet_duration = facet_start.elapsed();
        info!(
            tasks = tasks.len(),
            facet_tasks = tasks.len() - global_tasks,
            duration = %format_hms(facet_duration),
            "facet pass complete"
        );

        Collection {
            tasks,
            stats: ctx.stats,
            global_tasks,
            global_duration,
            facet_duration,
        }
    }

    /// Walks unfiltered pages `1..=n`, where `n` is bounded by the global page
    /// ceiling, the reported total, and `max_pages`.
    async fn global_pass(&self, ctx: &mut CollectContext, tasks: &mut Vec<TaskRecord>) {
        let unfiltered = FilterSpec::unfiltered();
        let Ok(total) = probe(self.source.as_ref(), &unfiltered, ctx).await else {
            warn!("global probe failed; skipping global pass");
            return;
        };

        let total_pages = total.div_ceil(u64::from(self.settings.page_size.max(1)));
        let mut pages = u32::try_from(total_pages)
            .unwrap_or(u32::MAX)
            .min(self.global_page_ceiling);
        if let Some(max_pages) = self.max_pages {
            pages = pages.min(max_pages);
        }
        info!(total, pages, "starting global pass");

        let start = Instant::now();
        for page in 1..=pages {
            let outcome = admit_page(
                self.source.as_ref(),
                &unfiltered,
                page,
                self.settings.page_size,
                ctx,
                tasks,
            )
            .await;
            let eta = estimate_remaining(start.elapsed(), page as usize, pages as usize);
            info!(
                page,
                pages,
                new_tasks = outcome.map_or(0, |o| o.admitted),
                total_tasks = tasks.len(),
                eta = %format_hms(eta),
                "global page"
            );
            if outcome.is_some_and(|o| o.received == 0) {
                debug!(page, pages, "empty global page; stopping global pass");
                break;
            }
        }
    }

    /// Covers each facet value in order, skipping values whose probe fails.
    async fn facet_pass(
        &self,
        facet_universe: &[&str],
        ctx: &mut CollectContext,
        tasks: &mut Vec<TaskRecord>,
    ) {
        let start = Instant::now();
        let count = facet_universe.len();
        for (index, facet) in facet_universe.iter().enumerate() {
            let done = index + 1;
            let name = countries::display_name(facet);
            match self.collect_facet(facet, ctx).await {
                Ok(new_tasks) => {
                    let added = new_tasks.len();
                    tasks.extend(new_tasks);
                    let eta = estimate_remaining(start.elapsed(), done, count);
                    info!(
                        progress = %format!("{done}/{count}"),
                        facet = %name,
                        new_tasks = added,
                        total_tasks = tasks.len(),
                        eta = %format_hms(eta),
                        "facet collected"
                    );
                }
                Err(error) => {
                    ctx.stats.failed_facets += 1;
                    warn!(facet = %name, error = %error, "facet skipped after failure");
                }
            }

            if let Some(cap) = self.task_cap
                && tasks.len() >= cap
            {
                info!(cap, tasks = tasks.len(), "task cap reached; stopping facet pass");
                break;
            }
        }
    }

    /// Collects one facet value: direct fetch when it fits, else per sex,
    /// delegating over-ceiling sexes to the splitter over the full age range.
    ///
    /// # Errors
    ///
    /// Returns the probe error for the facet alone; smaller units fail in place.
    #[instrument(level = "debug", skip(self, ctx))]
    async fn collect_facet(
        &self,
        facet: &str,
        ctx: &mut CollectContext,
    ) -> Result<Vec<TaskRecord>, SourceError> {
        let source = self.source.as_ref();
        let filter = FilterSpec::for_facet(facet);
        let total = probe(source, &filter, ctx).await?;
        if total == 0 {
            debug!(facet, "no matches");
            return Ok(Vec::new());
        }
        if total <= self.settings.ceiling {
            return Ok(fetch_partition(source, &filter, total, self.settings, ctx).await);
        }

        let mut tasks = Vec::new();
        for sex in Sex::ALL {
            let by_sex = filter.with_sex(sex);
            let Ok(sex_total) = probe(source, &by_sex, ctx).await else {
                continue;
            };
            if sex_total == 0 {
                continue;
            }
            if sex_total <= self.settings.ceiling {
                tasks.extend(fetch_partition(source, &by_sex, sex_total, self.settings, ctx).await);
            } else {
                let splitter = CoverageSplitter::new(source, self.settings);
                let outcome = splitter.split(&by_sex.with_ages(AgeRange::FULL), ctx).await;
                debug!(
                    facet,
                    sex = %sex,
                    leaves = outcome.leaves.len(),
                    new_tasks = outcome.tasks.len(),
                    "split complete"
                );
                tasks.extend(outcome.tasks);
            }
        }
        Ok(tasks)
    }
}
