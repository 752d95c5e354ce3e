//! Coverage-complete task collection.
//!
//! The search API never returns more than a fixed number of results for one
//! query, so a single unfiltered walk misses most of the population. This
//! module finds every entity anyway:
//!
//! 1. A global pass walks the unfiltered result pages up to the page ceiling.
//! 2. A facet pass queries each country code; countries over the ceiling are
//!    split by sex, then handed to the [`CoverageSplitter`], which bisects the
//!    age range until each partition fits under the ceiling.
//!
//! Everything discovered flows through one [`SeenSet`], so an entity found in
//! several overlapping partitions becomes exactly one [`TaskRecord`].
//!
//! Collection is strictly sequential. Probe/page failures are handled at the
//! smallest enclosing unit (one page, one partition, one facet value) and only
//! show up in [`CollectionStats`].

mod collector;
mod dedup;
mod pacer;
mod paging;
mod splitter;

pub use collector::{Collection, TaskCollector};
pub use dedup::{DedupKey, SeenSet};
pub use pacer::Pacer;
pub use splitter::{CoverageSplitter, Leaf, LeafOutcome, SplitOutcome};

use crate::config::HarvestConfig;
use crate::source::Notice;

/// A lightweight reference to one discovered entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    /// Raw search summary.
    pub summary: Notice,
    /// Detail URL from the summary's self link, or empty.
    pub detail_url: String,
    /// Entity identifier, or empty.
    pub entity_id: String,
}

impl EntityRef {
    /// Builds a reference from a search summary.
    #[must_use]
    pub fn from_summary(summary: Notice) -> Self {
        let detail_url = summary.self_link();
        let entity_id = summary.entity_id();
        Self {
            summary,
            detail_url,
            entity_id,
        }
    }
}

/// An entity reference that survived deduplication.
///
/// Only [`SeenSet::admit`] creates these; they are immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    entity: EntityRef,
}

impl TaskRecord {
    fn new(entity: EntityRef) -> Self {
        Self { entity }
    }

    /// The admitted entity reference.
    #[must_use]
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Consumes the task, returning the entity reference.
    #[must_use]
    pub fn into_entity(self) -> EntityRef {
        self.entity
    }
}

/// Coverage statistics for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Probe calls that succeeded.
    pub probes: usize,
    /// Probe calls that failed.
    pub failed_probes: usize,
    /// Page calls that succeeded.
    pub pages: usize,
    /// Page calls that failed.
    pub failed_pages: usize,
    /// Summaries received across all pages.
    pub received: usize,
    /// Summaries rejected as already seen.
    pub duplicates: usize,
    /// Partitions fetched only up to the ceiling.
    pub lossy_partitions: usize,
    /// Reported matches left behind by lossy partitions.
    pub unreachable: u64,
    /// Facet values skipped because of a failure.
    pub failed_facets: usize,
    /// Deepest splitter recursion level reached.
    pub max_depth_reached: u32,
}

/// Paging and splitting parameters shared by the splitter and the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSettings {
    /// Results requested per page.
    pub page_size: u32,
    /// Largest result count retrievable from one partition.
    pub ceiling: u64,
    /// Maximum recursion depth.
    pub max_depth: u32,
}

impl PartitionSettings {
    /// Number of pages needed to retrieve `total` results, capped at the ceiling.
    #[must_use]
    pub fn pages_for(&self, total: u64) -> u32 {
        let retrievable = total.min(self.ceiling);
        let pages = retrievable.div_ceil(u64::from(self.page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl From<&HarvestConfig> for PartitionSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            page_size: config.page_size,
            ceiling: config.ceiling,
            max_depth: config.max_depth,
        }
    }
}

/// Mutable state threaded through one sequential collection run.
#[derive(Debug)]
pub struct CollectContext {
    /// Dedup state shared by every pass.
    pub seen: SeenSet,
    /// Spacing between sequential calls.
    pub pacer: Pacer,
    /// Coverage counters.
    pub stats: CollectionStats,
}

impl CollectContext {
    /// Creates a fresh context.
    #[must_use]
    pub fn new(pacer: Pacer) -> Self {
        Self {
            seen: SeenSet::new(),
            pacer,
            stats: CollectionStats::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entity_ref_from_summary_extracts_identity() {
        let summary = Notice::from_value(json!({
            "entity_id": "2020/1",
            "_links": {"self": {"href": "https://api/red/2020-1"}}
        }))
        .unwrap();
        let entity = EntityRef::from_summary(summary);
        assert_eq!(entity.entity_id, "2020/1");
        assert_eq!(entity.detail_url, "https://api/red/2020-1");
    }

    #[test]
    fn test_pages_for_caps_at_ceiling() {
        let settings = PartitionSettings {
            page_size: 160,
            ceiling: 160,
            max_depth: 10,
        };
        assert_eq!(settings.pages_for(0), 0);
        assert_eq!(settings.pages_for(1), 1);
        assert_eq!(settings.pages_for(160), 1);
        assert_eq!(settings.pages_for(5000), 1);

        let wide = PartitionSettings {
            page_size: 20,
            ceiling: 100,
            max_depth: 10,
        };
        assert_eq!(wide.pages_for(41), 3);
        assert_eq!(wide.pages_for(1000), 5);
    }
}
