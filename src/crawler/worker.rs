//! Fetch-extract worker for a single detail page
//!
//! A worker claims its address in the shared visited set, fetches the page,
//! and runs the record extractor over it. Every outcome, including failure,
//! is returned as a value; nothing a worker does can abort its siblings or
//! the coordinator.

use crate::crawler::extract::{GeoStatus, RecordExtractor};
use crate::crawler::fetcher::{fetch_with_retry, PageFetcher, RetryPolicy};
use crate::output::{FailureKind, FailureReport, FailureStage};
use crate::record::PropertyRecord;
use crate::state::{HomeIdCounter, VisitedSet};
use std::sync::Arc;

/// Shared handles every worker needs
///
/// Cloning is cheap: all members are reference-counted, so clones observe the
/// same visited set and the same id counter.
#[derive(Clone)]
pub struct WorkerContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub visited: VisitedSet,
    pub ids: HomeIdCounter,
    pub extractor: Arc<RecordExtractor>,
    pub retry: RetryPolicy,
}

impl WorkerContext {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<RecordExtractor>,
        ids: HomeIdCounter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            visited: VisitedSet::new(),
            ids,
            extractor,
            retry,
        }
    }
}

/// How a worker settled
#[derive(Debug, Clone)]
pub enum WorkerOutcome {
    /// A complete record was extracted
    Succeeded {
        url: String,
        record: PropertyRecord,
        geo: GeoStatus,
    },

    /// Another worker had already claimed the address
    Skipped { url: String },

    /// The fetch failed; the address contributes nothing
    Failed(FailureReport),
}

impl WorkerOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Succeeded { url, .. } | Self::Skipped { url } => url,
            Self::Failed(report) => &report.url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Processes one detail address end to end
///
/// # Arguments
///
/// * `url` - Absolute detail-page address
/// * `context` - Shared visited set, id counter, fetcher and extractor
///
/// # Returns
///
/// The settled [`WorkerOutcome`]. A skipped address causes no fetch and does
/// not advance the id counter; a failed fetch does not advance it either.
pub async fn process_detail(url: String, context: WorkerContext) -> WorkerOutcome {
    if !context.visited.claim(&url) {
        tracing::debug!(url = %url, "Already claimed, skipping");
        return WorkerOutcome::Skipped { url };
    }

    let attempt = fetch_with_retry(context.fetcher.as_ref(), &url, context.retry).await;
    let body = match attempt.result {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %url, kind = %e.kind(), "Detail fetch failed: {}", e);
            return WorkerOutcome::Failed(FailureReport {
                url,
                stage: FailureStage::DetailPage,
                kind: e.kind(),
                message: e.to_string(),
                attempts: attempt.attempts,
            });
        }
    };

    // Parsing a large page is CPU-bound, so it runs on the blocking pool
    let extractor = context.extractor.clone();
    let ids = context.ids.clone();
    let extraction =
        match tokio::task::spawn_blocking(move || extractor.extract_from_html(&body, &ids)).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::error!(url = %url, "Extraction did not complete: {}", e);
                return WorkerOutcome::Failed(FailureReport {
                    url,
                    stage: FailureStage::DetailPage,
                    kind: FailureKind::WorkerAborted,
                    message: e.to_string(),
                    attempts: attempt.attempts,
                });
            }
        };

    if let GeoStatus::Malformed(reason) = &extraction.geo {
        tracing::warn!(url = %url, "Unreadable coordinate block: {}", reason);
    }

    tracing::debug!(
        url = %url,
        home_id = extraction.record.home_id,
        "Extracted record"
    );

    WorkerOutcome::Succeeded {
        url,
        record: extraction.record,
        geo: extraction.geo,
    }
}
