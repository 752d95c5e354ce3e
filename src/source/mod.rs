//! Search API seam and its HTTP implementation.
//!
//! The collection and fetch stages only ever talk to the API through the
//! [`NoticeSource`] trait, so the partitioning logic can be exercised against
//! in-memory sources and the transport can be swapped freely.
//!
//! # Architecture
//!
//! - [`NoticeSource`] - Async trait: probe a partition, fetch one page, fetch one detail
//! - [`HttpNoticeSource`] - `reqwest`-backed implementation for the public endpoint
//! - [`FilterSpec`] / [`AgeRange`] / [`Sex`] - Query partition descriptors
//! - [`Notice`] - Lenient wrapper around raw notice JSON objects
//!
//! # Example
//!
//! ```no_run
//! use notice_harvester::source::{FilterSpec, HttpNoticeSource, NoticeSource};
//! use notice_harvester::HarvestConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpNoticeSource::new(&HarvestConfig::default())?;
//! let total = source.probe_total(&FilterSpec::for_facet("FR")).await?;
//! println!("FR notices: {total}");
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
mod filter;
mod http;
mod notice;

pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, REQUEST_TIMEOUT_SECS};
pub use error::SourceError;
pub use filter::{AGE_CEILING, AGE_FLOOR, AgeRange, FilterSpec, Sex};
pub use http::HttpNoticeSource;
pub use notice::{Notice, SearchPage, is_present, value_text};

use async_trait::async_trait;

/// How a detail record is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailRef {
    /// Absolute detail URL taken from the summary's self link.
    Url(String),
    /// Entity identifier, resolved against the source's base URL.
    EntityId(String),
}

impl DetailRef {
    /// Picks the detail URL when present, else the entity identifier.
    #[must_use]
    pub fn choose(detail_url: &str, entity_id: &str) -> Option<Self> {
        if !detail_url.is_empty() {
            Some(Self::Url(detail_url.to_string()))
        } else if !entity_id.is_empty() {
            Some(Self::EntityId(entity_id.to_string()))
        } else {
            None
        }
    }
}

/// Read access to a paginated, filterable notice search API.
///
/// # Object Safety
///
/// This trait uses `async_trait` so sources can be shared as
/// `Arc<dyn NoticeSource>` across the detail-fetch workers.
#[async_trait]
pub trait NoticeSource: Send + Sync {
    /// Returns the match count for `filter`.
    ///
    /// The reported count may be approximate; implementations return
    /// `max(reported, observed)` for the first page.
    async fn probe_total(&self, filter: &FilterSpec) -> Result<u64, SourceError>;

    /// Returns one page (1-based) of summaries matching `filter`.
    async fn fetch_page(
        &self,
        filter: &FilterSpec,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Notice>, SourceError>;

    /// Returns the extended record for one entity.
    async fn fetch_detail(&self, reference: &DetailRef) -> Result<Notice, SourceError>;
}
