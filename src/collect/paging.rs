//! Paced probe and page calls that feed the shared [`SeenSet`](super::SeenSet).
//!
//! Failures are logged and counted here, at the smallest unit (one probe, one
//! page), and handed back as values so each caller decides what to skip.

use tracing::{debug, warn};

use super::{CollectContext, EntityRef, PartitionSettings, TaskRecord};
use crate::source::{FilterSpec, NoticeSource, SourceError};

/// Result of walking one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageOutcome {
    /// Summaries the page contained.
    pub(crate) received: usize,
    /// Summaries admitted as new tasks.
    pub(crate) admitted: usize,
}

/// Probes the match count for `filter`.
pub(crate) async fn probe(
    source: &dyn NoticeSource,
    filter: &FilterSpec,
    ctx: &mut CollectContext,
) -> Result<u64, SourceError> {
    ctx.pacer.acquire().await;
    match source.probe_total(filter).await {
        Ok(total) => {
            ctx.stats.probes += 1;
            debug!(filter = %filter, total, "probe");
            Ok(total)
        }
        Err(error) => {
            ctx.stats.failed_probes += 1;
            warn!(filter = %filter, kind = error.kind(), error = %error, "probe failed");
            Err(error)
        }
    }
}

/// Fetches one page and admits every unseen summary into `out`.
///
/// Returns `None` if the page call failed; the failure is already logged.
pub(crate) async fn admit_page(
    source: &dyn NoticeSource,
    filter: &FilterSpec,
    page: u32,
    page_size: u32,
    ctx: &mut CollectContext,
    out: &mut Vec<TaskRecord>,
) -> Option<PageOutcome> {
    ctx.pacer.acquire().await;
    let notices = match source.fetch_page(filter, page, page_size).await {
        Ok(notices) => notices,
        Err(error) => {
            ctx.stats.failed_pages += 1;
            warn!(
                filter = %filter,
                page,
                kind = error.kind(),
                error = %error,
                "page fetch failed; skipping page"
            );
            return None;
        }
    };

    ctx.stats.pages += 1;
    let received = notices.len();
    ctx.stats.received += received;
    let mut admitted = 0;
    for notice in notices {
        match ctx.seen.admit(EntityRef::from_summary(notice)) {
            Some(task) => {
                out.push(task);
                admitted += 1;
            }
            None => ctx.stats.duplicates += 1,
        }
    }
    debug!(filter = %filter, page, received, admitted, "page walked");
    Some(PageOutcome { received, admitted })
}

/// Fetches every retrievable page of a partition whose total is known.
///
/// Stops early when a page comes back empty, since reported totals can
/// overshoot what the API actually serves.
pub(crate) async fn fetch_partition(
    source: &dyn NoticeSource,
    filter: &FilterSpec,
    total: u64,
    settings: PartitionSettings,
    ctx: &mut CollectContext,
) -> Vec<TaskRecord> {
    let pages = settings.pages_for(total);
    let mut tasks = Vec::new();
    for page in 1..=pages {
        let Some(outcome) =
            admit_page(source, filter, page, settings.page_size, ctx, &mut tasks).await
        else {
            continue;
        };
        if outcome.received == 0 {
            debug!(filter = %filter, page, pages, "empty page before expected end");
            break;
        }
    }
    tasks
}
