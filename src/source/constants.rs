//! Constants for the search API source (endpoint, paging, timeouts).

/// Public red-notice search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://ws-public.interpol.int/notices/v1/red";

/// Results per page; the largest value the API answers reliably.
pub const DEFAULT_PAGE_SIZE: u32 = 160;

/// Default per-request timeout (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
