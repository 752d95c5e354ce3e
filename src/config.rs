//! Run configuration.
//!
//! Every tunable of a harvest run lives in [`HarvestConfig`], which is built
//! once at startup (CLI flags, environment) and passed by reference into the
//! collector, the detail pool, and the HTTP source. Nothing is process-global.

use std::time::Duration;

use thiserror::Error;

use crate::source::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};

pub use crate::source::DEFAULT_PAGE_SIZE;

/// Default per-partition retrievable ceiling (one full page).
pub const DEFAULT_CEILING: u64 = DEFAULT_PAGE_SIZE as u64;

/// Default number of unfiltered pages walked by the global pass.
pub const DEFAULT_GLOBAL_PAGE_CEILING: u32 = 50;

/// Default maximum recursion depth of the coverage splitter.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Default detail-fetch worker count.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Default pause between sequential collection calls (500 ms).
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Default pause before each detail request inside a worker (100 ms).
pub const DEFAULT_DETAIL_DELAY: Duration = Duration::from_millis(100);

/// Minimum allowed worker count.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker count.
pub const MAX_CONCURRENCY: usize = 100;

/// Fatal configuration errors, reported once at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Partition ceiling must be positive.
    #[error("invalid ceiling {value}: must be greater than 0")]
    InvalidCeiling {
        /// The rejected value.
        value: u64,
    },

    /// Page size must be positive.
    #[error("invalid page size {value}: must be greater than 0")]
    InvalidPageSize {
        /// The rejected value.
        value: u32,
    },

    /// Global pass page ceiling must be positive.
    #[error("invalid global page ceiling {value}: must be greater than 0")]
    InvalidGlobalPageCeiling {
        /// The rejected value.
        value: u32,
    },

    /// Worker count out of range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// Request timeout must be positive.
    #[error("invalid request timeout: must be greater than 0")]
    InvalidTimeout,

    /// Base URL must be absolute http(s).
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// All scalar parameters of a harvest run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    /// Results requested per page.
    pub page_size: u32,
    /// Largest result count retrievable from one partition.
    pub ceiling: u64,
    /// Unfiltered pages walked by the global pass.
    pub global_page_ceiling: u32,
    /// Maximum splitter recursion depth before the lossy fallback.
    pub max_depth: u32,
    /// Pause between sequential probe/page calls during collection.
    pub delay: Duration,
    /// Pause before each detail request inside a worker.
    pub detail_delay: Duration,
    /// Detail-fetch worker count.
    pub concurrency: usize,
    /// Optional cap: limits the global pass to this many pages and stops the
    /// facet pass once `max_pages * page_size` tasks are collected.
    pub max_pages: Option<u32>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Search endpoint.
    pub base_url: String,
    /// Raw `Cookie` header value passed through verbatim.
    pub cookie: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            ceiling: DEFAULT_CEILING,
            global_page_ceiling: DEFAULT_GLOBAL_PAGE_CEILING,
            max_depth: DEFAULT_MAX_DEPTH,
            delay: DEFAULT_DELAY,
            detail_delay: DEFAULT_DETAIL_DELAY,
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: None,
            insecure: false,
        }
    }
}

impl HarvestConfig {
    /// Checks every parameter that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
            });
        }
        if self.ceiling == 0 {
            return Err(ConfigError::InvalidCeiling {
                value: self.ceiling,
            });
        }
        if self.global_page_ceiling == 0 {
            return Err(ConfigError::InvalidGlobalPageCeiling {
                value: self.global_page_ceiling,
            });
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        let scheme_ok = url::Url::parse(&self.base_url)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !scheme_ok {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
            });
        }
        Ok(())
    }

    /// Task count at which the facet pass stops, when `max_pages` is set.
    #[must_use]
    pub fn task_cap(&self) -> Option<usize> {
        self.max_pages
            .map(|pages| (pages as usize).saturating_mul(self.page_size as usize))
    }
}
