use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use notice_harvester::record::countries;
use notice_harvester::{CsvSink, Harvester, HttpNoticeSource, NoticeSource};
use tracing::{debug, info};

use crate::app::{progress_manager, terminal};
use crate::cli::Args;

pub(crate) async fn run_harvest(args: Args) -> Result<()> {
    terminal::init_tracing(terminal::default_log_level(args.quiet, args.verbose));
    debug!(
        output = %args.output.display(),
        workers = args.workers,
        max_pages = ?args.max_pages,
        cookie_set = args.cookie.is_some(),
        insecure = args.insecure,
        "CLI arguments parsed"
    );

    let config = args.harvest_config();
    config.validate().context("invalid configuration")?;
    info!(
        base_url = %config.base_url,
        workers = config.concurrency,
        page_size = config.page_size,
        ceiling = config.ceiling,
        delay_ms = config.delay.as_millis(),
        "Notice harvester starting"
    );

    let source: Arc<dyn NoticeSource> =
        Arc::new(HttpNoticeSource::new(&config).context("failed to build HTTP client")?);
    let harvester = Harvester::new(config, source)?;

    let output = args.output.display().to_string();
    let mut sink = CsvSink::create(&args.output)
        .with_context(|| format!("cannot create output file {output}"))?;

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, harvester.fetch_stats());

    let facets = countries::facet_universe();
    let outcome = harvester.run(&facets, &mut sink).await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let report = outcome.with_context(|| format!("failed writing {output}"))?;
    report.log_summary(&output);
    Ok(())
}
