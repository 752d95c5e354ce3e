//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use notice_harvester::config::{
    DEFAULT_CONCURRENCY, DEFAULT_GLOBAL_PAGE_CEILING, DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE,
};
use notice_harvester::HarvestConfig;
use notice_harvester::source::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};

/// Harvest every red notice from the public search API into a CSV file.
///
/// Works around the API's per-query result ceiling by walking the unfiltered
/// listing, then every nationality, splitting oversized partitions by sex and
/// age until each one is fully retrievable.
#[derive(Parser, Debug)]
#[command(name = "notice-harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Limit the global pass to N pages and stop the facet pass after N x page-size tasks
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// Pause between sequential search calls, in seconds
    #[arg(long, env = "SCRAPER_DELAY", default_value = "0.5", value_parser = parse_seconds)]
    pub delay: Duration,

    /// Output CSV path
    #[arg(short, long, default_value = "interpol_parallel.csv")]
    pub output: PathBuf,

    /// Concurrent detail-fetch workers (1-100)
    #[arg(short = 'w', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub workers: u8,

    /// Results requested per search page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Largest result count retrievable from one query (defaults to the page size)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub ceiling: Option<u64>,

    /// Unfiltered pages walked by the global pass
    #[arg(long, default_value_t = DEFAULT_GLOBAL_PAGE_CEILING, value_parser = clap::value_parser!(u32).range(1..))]
    pub global_pages: u32,

    /// Maximum age/sex split depth before falling back to a partial fetch
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Pause before each detail request, in milliseconds (0 to disable)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub detail_delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    /// Search endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Raw Cookie header sent with every request
    #[arg(long, env = "SCRAPER_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "SCRAPER_INSECURE")]
    pub insecure: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// Builds the library configuration from parsed arguments.
    #[must_use]
    pub fn harvest_config(&self) -> HarvestConfig {
        HarvestConfig {
            page_size: self.page_size,
            ceiling: self.ceiling.unwrap_or(u64::from(self.page_size)),
            global_page_ceiling: self.global_pages,
            max_depth: self.max_depth,
            delay: self.delay,
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            concurrency: usize::from(self.workers),
            max_pages: self.max_pages,
            timeout: Duration::from_secs(self.timeout),
            base_url: self.base_url.clone(),
            cookie: self
                .cookie
                .as_deref()
                .map(str::trim)
                .filter(|cookie| !cookie.is_empty())
                .map(ToString::to_string),
            insecure: self.insecure,
        }
    }
}

/// Parses a non-negative number of seconds, fractional values allowed.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("'{value}' must be a non-negative duration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["notice-harvester"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.workers, 20);
        assert_eq!(args.page_size, 160);
        assert_eq!(args.global_pages, 50);
        assert_eq!(args.max_depth, 10);
        assert_eq!(args.detail_delay_ms, 100);
        assert_eq!(args.output, PathBuf::from("interpol_parallel.csv"));
        assert!(args.max_pages.is_none());
        assert!(!args.no_progress);
    }

    #[test]
    fn test_cli_default_config_is_valid() {
        let args = Args::try_parse_from(["notice-harvester"]).unwrap();
        let config = args.harvest_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.ceiling, 160);
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["notice-harvester", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["notice-harvester", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["notice-harvester", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["notice-harvester", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_workers_bounds() {
        let args = Args::try_parse_from(["notice-harvester", "-w", "1"]).unwrap();
        assert_eq!(args.workers, 1);
        let args = Args::try_parse_from(["notice-harvester", "--workers", "100"]).unwrap();
        assert_eq!(args.workers, 100);

        for value in ["0", "101"] {
            let err = Args::try_parse_from(["notice-harvester", "-w", value]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_delay_accepts_fractional_seconds() {
        let args = Args::try_parse_from(["notice-harvester", "--delay", "0.25"]).unwrap();
        assert_eq!(args.delay, Duration::from_millis(250));
        let args = Args::try_parse_from(["notice-harvester", "--delay", "0"]).unwrap();
        assert_eq!(args.delay, Duration::ZERO);
    }

    #[test]
    fn test_cli_delay_rejects_negative_and_garbage() {
        for value in ["--delay=-1", "--delay=soon"] {
            let err = Args::try_parse_from(["notice-harvester", value]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_ceiling_defaults_to_page_size() {
        let args = Args::try_parse_from(["notice-harvester", "--page-size", "20"]).unwrap();
        assert_eq!(args.harvest_config().ceiling, 20);

        let args =
            Args::try_parse_from(["notice-harvester", "--page-size", "20", "--ceiling", "100"])
                .unwrap();
        assert_eq!(args.harvest_config().ceiling, 100);
    }

    #[test]
    fn test_cli_zero_page_size_rejected() {
        let err = Args::try_parse_from(["notice-harvester", "--page-size", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_pages_sets_task_cap() {
        let args = Args::try_parse_from(["notice-harvester", "--max-pages", "2"]).unwrap();
        let config = args.harvest_config();
        assert_eq!(config.max_pages, Some(2));
        assert_eq!(config.task_cap(), Some(320));
    }

    #[test]
    fn test_cli_blank_cookie_is_dropped() {
        let args = Args::try_parse_from(["notice-harvester", "--cookie", "  "]).unwrap();
        assert!(args.harvest_config().cookie.is_none());

        let args = Args::try_parse_from(["notice-harvester", "--cookie", " a=b "]).unwrap();
        assert_eq!(args.harvest_config().cookie.as_deref(), Some("a=b"));
    }
}
