//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Drawing the reproducible sample of index pages
//! - Fetching each index page and discovering its detail links
//! - Dispatching a bounded pool of fetch-extract workers per page
//! - Collecting worker outcomes into the record accumulator
//! - Handling interrupts and run deadlines
//! - Writing the final outputs

use crate::config::{validate, Config};
use crate::crawler::discover::LinkDiscoverer;
use crate::crawler::extract::{GeoStatus, RecordExtractor};
use crate::crawler::fetcher::{fetch_with_retry, HttpFetcher, PageFetcher, RetryPolicy};
use crate::crawler::sampling::SampledPageIndex;
use crate::crawler::worker::{process_detail, WorkerContext, WorkerOutcome};
use crate::output::{self, CrawlStatistics, FailureKind, FailureReport, FailureStage};
use crate::record::PropertyRecord;
use crate::state::{HomeIdCounter, RunPhase};
use crate::HarvestError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Extracted records, ordered by `home_id`
    pub records: Vec<PropertyRecord>,

    pub stats: CrawlStatistics,

    /// The index pages this run drew
    pub sample: SampledPageIndex,

    /// Output files written, empty until outputs are written
    pub written: Vec<PathBuf>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    discoverer: LinkDiscoverer,
    context: WorkerContext,
    semaphore: Arc<Semaphore>,
    shutdown: Arc<AtomicBool>,
    phase: RunPhase,
}

impl Coordinator {
    /// Creates a new coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator around any [`PageFetcher`]
    ///
    /// The configuration is validated here, so a bad config fails before the
    /// first request is made.
    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let origin = config.crawler.resolved_origin()?;
        let discoverer = LinkDiscoverer::new(origin, config.crawler.detail_path_prefix.clone())?;
        let extractor = Arc::new(RecordExtractor::new()?);

        let context = WorkerContext::new(
            fetcher.clone(),
            extractor,
            HomeIdCounter::new(config.crawler.first_home_id),
            RetryPolicy::from_config(&config.crawler),
        );
        let semaphore = Arc::new(Semaphore::new(config.crawler.concurrency_limit as usize));

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            discoverer,
            context,
            semaphore,
            shutdown: Arc::new(AtomicBool::new(false)),
            phase: RunPhase::Sampling,
        })
    }

    /// Flag that stops the run when set
    ///
    /// No new index page is started and no new worker is dispatched once the
    /// flag is set. Workers already running are allowed to settle.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs the crawl over every sampled index page
    ///
    /// On return the run is in [`RunPhase::Aggregated`]: the record set is
    /// final and ready to be written.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let started = Instant::now();
        let crawler = &self.config.crawler;

        let sample = SampledPageIndex::draw(
            crawler.max_index_pages,
            crawler.pages_to_sample,
            crawler.random_seed,
        )?;
        tracing::info!(
            "Sampled {} of {} index pages (seed {})",
            sample.len(),
            crawler.max_index_pages,
            sample.seed()
        );

        let deadline = crawler.max_run_duration().map(|limit| started + limit);
        let mut stats = CrawlStatistics::new(sample.len());
        let mut records = Vec::new();

        self.phase = self.phase.transition(RunPhase::Crawling)?;

        for (position, page) in sample.iter().enumerate() {
            if self.should_stop(deadline) {
                tracing::warn!(
                    "Stopping after {} of {} index pages",
                    position,
                    sample.len()
                );
                stats.interrupted = true;
                break;
            }

            let page_records = self.crawl_index_page(page, deadline, &mut stats).await;
            tracing::info!(
                "Page {} ({}/{}): {} records, {} total",
                page,
                position + 1,
                sample.len(),
                page_records.len(),
                records.len() + page_records.len()
            );
            records.extend(page_records);
        }

        self.phase = self.phase.transition(RunPhase::Aggregated)?;

        records.sort_by_key(|record| record.home_id);
        stats.finish(started.elapsed());

        tracing::info!(
            "Crawl completed: {} records from {} index pages in {:?}",
            records.len(),
            stats.index_pages_fetched,
            stats.elapsed
        );

        Ok(CrawlReport {
            records,
            stats,
            sample,
            written: Vec::new(),
        })
    }

    /// Writes the finished record set to the configured outputs
    pub fn write_outputs(&mut self, report: &mut CrawlReport) -> Result<(), HarvestError> {
        self.phase = self.phase.transition(RunPhase::Output)?;
        report.written = output::write_outputs(&report.records, &self.config.output)?;
        Ok(())
    }

    /// Fetches one index page and processes every detail link on it
    ///
    /// A failed index fetch is recorded and contributes no records; it never
    /// ends the run.
    async fn crawl_index_page(
        &self,
        page: u32,
        deadline: Option<Instant>,
        stats: &mut CrawlStatistics,
    ) -> Vec<PropertyRecord> {
        let delay = self.config.crawler.inter_request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = self.config.crawler.index_page_url(page);
        let attempt = fetch_with_retry(self.fetcher.as_ref(), &url, self.context.retry).await;
        let body = match attempt.result {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, kind = %e.kind(), "Index fetch failed: {}", e);
                stats.record_failure(FailureReport {
                    url,
                    stage: FailureStage::IndexPage,
                    kind: e.kind(),
                    message: e.to_string(),
                    attempts: attempt.attempts,
                });
                return Vec::new();
            }
        };
        stats.index_pages_fetched += 1;

        let links = self.discoverer.discover_in_html(&body);
        tracing::debug!(url = %url, "Discovered {} detail links", links.len());
        stats.links_discovered += links.len() as u64;

        let workers = self.dispatch(links, deadline, stats).await;
        collect(workers, stats).await
    }

    /// Spawns one worker per link, never more than the concurrency limit at once
    async fn dispatch(
        &self,
        links: Vec<String>,
        deadline: Option<Instant>,
        stats: &mut CrawlStatistics,
    ) -> Vec<(String, JoinHandle<WorkerOutcome>)> {
        let mut workers = Vec::with_capacity(links.len());

        for link in links {
            if self.should_stop(deadline) {
                stats.interrupted = true;
                break;
            }

            let Ok(permit) = self.semaphore.clone().acquire_owned().await else {
                break;
            };

            let context = self.context.clone();
            let url = link.clone();
            let handle = tokio::spawn(async move {
                let outcome = process_detail(url, context).await;
                drop(permit);
                outcome
            });

            stats.workers_dispatched += 1;
            workers.push((link, handle));
        }

        workers
    }

    fn should_stop(&self, deadline: Option<Instant>) -> bool {
        if self.shutdown.load(Ordering::SeqCst) {
            return true;
        }
        deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Waits for every dispatched worker and folds the outcomes into `stats`
async fn collect(
    workers: Vec<(String, JoinHandle<WorkerOutcome>)>,
    stats: &mut CrawlStatistics,
) -> Vec<PropertyRecord> {
    let mut records = Vec::new();

    for (url, handle) in workers {
        match handle.await {
            Ok(WorkerOutcome::Succeeded { record, geo, .. }) => {
                stats.records_extracted += 1;
                match geo {
                    GeoStatus::Found => stats.coordinates_found += 1,
                    GeoStatus::Malformed(_) => stats.coordinates_malformed += 1,
                    GeoStatus::Missing | GeoStatus::Incomplete => {}
                }
                records.push(record);
            }
            Ok(WorkerOutcome::Skipped { .. }) => {
                stats.duplicates_skipped += 1;
            }
            Ok(WorkerOutcome::Failed(report)) => {
                stats.record_failure(report);
            }
            Err(e) => {
                tracing::error!(url = %url, "Worker did not settle: {}", e);
                stats.record_failure(FailureReport {
                    url,
                    stage: FailureStage::DetailPage,
                    kind: FailureKind::WorkerAborted,
                    message: e.to_string(),
                    attempts: 0,
                });
            }
        }
    }

    records
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Validate the configuration and build the HTTP client
/// 2. Draw the sample of index pages
/// 3. For each sampled page:
///    a. Fetch the index page
///    b. Discover detail links
///    c. Dispatch bounded concurrent workers
///    d. Collect settled outcomes
/// 4. Order the accumulated records by `home_id`
/// 5. Write the JSON and CSV outputs
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and outputs written
/// * `Err(HarvestError)` - Configuration, client, or output failure
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::load_config;
/// use listing_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    let mut report = coordinator.run().await?;
    coordinator.write_outputs(&mut report)?;
    Ok(report)
}
