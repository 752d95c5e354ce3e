//! Notice Harvester Library
//!
//! This library harvests the complete contents of a paginated, ceiling-limited
//! notice search API and turns every discovered entity into one normalized
//! output record.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`source`] - Search API seam ([`NoticeSource`]) and its HTTP implementation
//! - [`collect`] - Coverage-complete task collection (global pass, facet pass, age/sex splitting)
//! - [`fetch`] - Bounded-concurrency detail enrichment pool
//! - [`record`] - Summary/detail merging into flat output records
//! - [`sink`] - Output sinks (CSV)
//! - [`pipeline`] - End-to-end run orchestration and the final run report
//! - [`config`] - Validated run configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collect;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod sink;
pub mod source;

mod user_agent;

// Re-export commonly used types
pub use collect::{
    Collection, CollectionStats, CoverageSplitter, DedupKey, EntityRef, SeenSet, TaskCollector,
    TaskRecord,
};
pub use config::{
    ConfigError, DEFAULT_CEILING, DEFAULT_CONCURRENCY, DEFAULT_GLOBAL_PAGE_CEILING,
    DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE, HarvestConfig,
};
pub use fetch::{DetailFetchPool, FetchStats};
pub use pipeline::{Harvester, RunReport};
pub use record::{OutputRecord, merge_record};
pub use sink::{CsvSink, RecordSink, SinkError};
pub use source::{
    AgeRange, DetailRef, FilterSpec, HttpNoticeSource, Notice, NoticeSource, Sex, SourceError,
};
