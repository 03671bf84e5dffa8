//! Crawler module for sampling, fetching and extracting listings
//!
//! This module contains the core crawling logic, including:
//! - Seeded sampling of index pages
//! - HTTP fetching with optional retry of transient failures
//! - Detail link discovery and record extraction
//! - Fetch-extract workers and overall crawl coordination

mod coordinator;
mod discover;
mod extract;
mod fetcher;
mod sampling;
mod worker;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use discover::LinkDiscoverer;
pub use extract::{Extraction, GeoStatus, RecordExtractor};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, FetchAttempt, FetchError, HttpFetcher,
    PageFetcher, RetryPolicy,
};
pub use sampling::SampledPageIndex;
pub use worker::{process_detail, WorkerContext, WorkerOutcome};
