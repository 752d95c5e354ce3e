//! Recursive partitioning of an over-ceiling query.
//!
//! A partition whose match count exceeds the ceiling is narrowed until each
//! piece is retrievable: first by bisecting the age range, then, once the
//! range is a single age, by binding the sex facet (`M`, `F`, `U`). Depth is
//! bounded; a partition still over the ceiling at `max_depth` (or with no
//! facet left to bind) is fetched up to the ceiling and reported as lossy.
//!
//! The recursion runs on an explicit depth-first work stack, so children are
//! visited in the same order plain recursion would use (low ages before high
//! ages, `M` before `F` before `U`) and dedup outcomes stay deterministic.

use tracing::{debug, instrument, warn};

use super::paging::{fetch_partition, probe};
use super::{CollectContext, PartitionSettings, TaskRecord};
use crate::source::{FilterSpec, NoticeSource, Sex};

/// How a terminal partition was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOutcome {
    /// Probe reported no matches; nothing fetched.
    Empty,
    /// Total fit under the ceiling; all pages fetched.
    Complete,
    /// Still over the ceiling when splitting stopped; fetched up to the ceiling.
    Lossy,
    /// Probe failed; partition skipped.
    ProbeFailed,
}

/// A terminal partition of one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// The partition.
    pub filter: FilterSpec,
    /// Probed match count (0 when the probe failed).
    pub total: u64,
    /// Recursion depth at which the partition was resolved.
    pub depth: u32,
    /// How it was resolved.
    pub outcome: LeafOutcome,
}

/// Tasks and terminal partitions produced by one split.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    /// Newly admitted tasks, in discovery order.
    pub tasks: Vec<TaskRecord>,
    /// Terminal partitions, in visit order.
    pub leaves: Vec<Leaf>,
}

/// Narrows over-ceiling partitions until every piece is retrievable.
pub struct CoverageSplitter<'a> {
    source: &'a dyn NoticeSource,
    settings: PartitionSettings,
}

impl<'a> CoverageSplitter<'a> {
    /// Creates a splitter over `source`.
    #[must_use]
    pub fn new(source: &'a dyn NoticeSource, settings: PartitionSettings) -> Self {
        Self { source, settings }
    }

    /// Splits `filter` and collects every retrievable entity, deduplicated
    /// against `ctx.seen`.
    #[instrument(skip(self, ctx), fields(filter = %filter))]
    pub async fn split(&self, filter: &FilterSpec, ctx: &mut CollectContext) -> SplitOutcome {
        let mut outcome = SplitOutcome::default();
        if filter.age_range().is_none() {
            warn!("refusing to split partition with inverted age bounds");
            return outcome;
        }

        let mut stack = vec![(filter.clone(), 0u32)];
        while let Some((partition, depth)) = stack.pop() {
            ctx.stats.max_depth_reached = ctx.stats.max_depth_reached.max(depth);

            let Ok(total) = probe(self.source, &partition, ctx).await else {
                outcome.leaves.push(Leaf {
                    filter: partition,
                    total: 0,
                    depth,
                    outcome: LeafOutcome::ProbeFailed,
                });
                continue;
            };

            if total == 0 {
                outcome.leaves.push(Leaf {
                    filter: partition,
                    total,
                    depth,
                    outcome: LeafOutcome::Empty,
                });
                continue;
            }

            if total <= self.settings.ceiling {
                let tasks =
                    fetch_partition(self.source, &partition, total, self.settings, ctx).await;
                debug!(partition = %partition, total, depth, new_tasks = tasks.len(), "leaf fetched");
                outcome.tasks.extend(tasks);
                outcome.leaves.push(Leaf {
                    filter: partition,
                    total,
                    depth,
                    outcome: LeafOutcome::Complete,
                });
                continue;
            }

            if depth < self.settings.max_depth
                && let Some(children) = narrow(&partition)
            {
                debug!(partition = %partition, total, depth, children = children.len(), "splitting");
                // Reversed so the first child is popped first.
                stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                continue;
            }

            let unreachable = total - self.settings.ceiling;
            warn!(
                partition = %partition,
                total,
                ceiling = self.settings.ceiling,
                depth,
                unreachable,
                "partition still over ceiling; fetching up to ceiling only"
            );
            ctx.stats.lossy_partitions += 1;
            ctx.stats.unreachable += unreachable;
            let tasks = fetch_partition(self.source, &partition, total, self.settings, ctx).await;
            outcome.tasks.extend(tasks);
            outcome.leaves.push(Leaf {
                filter: partition,
                total,
                depth,
                outcome: LeafOutcome::Lossy,
            });
        }
        outcome
    }
}

/// Children of an over-ceiling partition, or `None` when nothing is left to narrow.
fn narrow(partition: &FilterSpec) -> Option<Vec<FilterSpec>> {
    let range = partition.age_range()?;
    if let Some((low, high)) = range.bisect() {
        return Some(vec![partition.with_ages(low), partition.with_ages(high)]);
    }
    if partition.sex.is_none() {
        return Some(Sex::ALL.iter().map(|sex| partition.with_sex(*sex)).collect());
    }
    None
}
