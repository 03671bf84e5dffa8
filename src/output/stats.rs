//! Run statistics and field coverage reports
//!
//! This module provides the counters a crawl run keeps while it works and
//! the console reports printed when it finishes.

use crate::output::traits::{FailureKind, FailureReport, FailureStage};
use crate::record::PropertyRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed: Duration,

    /// Number of index pages in the sample
    pub pages_sampled: usize,

    /// Index pages fetched successfully
    pub index_pages_fetched: u64,

    /// Detail links found across all fetched index pages
    pub links_discovered: u64,

    /// Detail workers spawned
    pub workers_dispatched: u64,

    /// Records that reached the accumulator
    pub records_extracted: u64,

    /// Links skipped because another worker had claimed them
    pub duplicates_skipped: u64,

    /// Records whose page carried both coordinates
    pub coordinates_found: u64,

    /// Records whose analytics block was present but unreadable
    pub coordinates_malformed: u64,

    /// Whether the run stopped before visiting every sampled page
    pub interrupted: bool,

    /// Every non-fatal failure, in the order it was observed
    pub failures: Vec<FailureReport>,
}

impl CrawlStatistics {
    /// Starts a fresh set of counters
    pub fn new(pages_sampled: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            elapsed: Duration::ZERO,
            pages_sampled,
            index_pages_fetched: 0,
            links_discovered: 0,
            workers_dispatched: 0,
            records_extracted: 0,
            duplicates_skipped: 0,
            coordinates_found: 0,
            coordinates_malformed: 0,
            interrupted: false,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, report: FailureReport) {
        self.failures.push(report);
    }

    /// Stamps the finish time and elapsed duration
    pub fn finish(&mut self, elapsed: Duration) {
        self.finished_at = Some(Utc::now());
        self.elapsed = elapsed;
    }

    pub fn index_pages_failed(&self) -> u64 {
        self.failures_at(FailureStage::IndexPage)
    }

    pub fn detail_pages_failed(&self) -> u64 {
        self.failures_at(FailureStage::DetailPage)
    }

    fn failures_at(&self, stage: FailureStage) -> u64 {
        self.failures.iter().filter(|f| f.stage == stage).count() as u64
    }

    /// Failure counts grouped by kind
    pub fn failures_by_kind(&self) -> BTreeMap<FailureKind, u64> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Share of settled detail workers that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.records_extracted + self.detail_pages_failed();
        if attempted == 0 {
            return 0.0;
        }
        (self.records_extracted as f64 / attempted as f64) * 100.0
    }
}

/// Formats a duration as `H hours, M minutes, and S.SS seconds`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = (total / 3600.0).floor();
    let minutes = ((total % 3600.0) / 60.0).floor();
    let seconds = total % 60.0;

    format!(
        "{} hours, {} minutes, and {:.2} seconds",
        hours as u64, minutes as u64, seconds
    )
}

/// Prints run statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if stats.interrupted {
        println!("  Stopped early: yes");
    }
    println!();

    println!("Index pages:");
    println!("  Sampled: {}", stats.pages_sampled);
    println!("  Fetched: {}", stats.index_pages_fetched);
    println!("  Failed: {}", stats.index_pages_failed());
    println!();

    println!("Detail pages:");
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Workers dispatched: {}", stats.workers_dispatched);
    println!("  Records extracted: {}", stats.records_extracted);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Failed: {}", stats.detail_pages_failed());
    println!(
        "  With coordinates: {} ({} malformed blocks)",
        stats.coordinates_found, stats.coordinates_malformed
    );
    println!();

    let by_kind = stats.failures_by_kind();
    if !by_kind.is_empty() {
        println!("Failures by kind:");
        for (kind, count) in by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} records)",
        stats.success_rate(),
        stats.records_extracted
    );
}

/// How often each field was present across a record set
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCoverage {
    pub total_records: usize,

    /// `(field name, records where it was available)` in column order
    pub present: Vec<(&'static str, usize)>,

    pub with_coordinates: usize,
}

/// Counts field availability across `records`
pub fn field_coverage(records: &[PropertyRecord]) -> FieldCoverage {
    let mut present: Vec<(&'static str, usize)> = match records.first() {
        Some(first) => first
            .text_fields()
            .iter()
            .map(|(name, _)| (*name, 0))
            .collect(),
        None => Vec::new(),
    };

    for record in records {
        for (slot, (_, value)) in present.iter_mut().zip(record.text_fields()) {
            if value.is_available() {
                slot.1 += 1;
            }
        }
    }

    FieldCoverage {
        total_records: records.len(),
        present,
        with_coordinates: records.iter().filter(|r| r.has_coordinates()).count(),
    }
}

/// Prints field coverage to stdout
pub fn print_coverage(coverage: &FieldCoverage) {
    println!("=== Field Coverage ===\n");
    println!("Records: {}\n", coverage.total_records);

    let percent = |count: usize| {
        if coverage.total_records == 0 {
            0.0
        } else {
            (count as f64 / coverage.total_records as f64) * 100.0
        }
    };

    for (name, count) in &coverage.present {
        println!("  {:<18} {:>6} ({:.1}%)", name, count, percent(*count));
    }
    println!(
        "  {:<18} {:>6} ({:.1}%)",
        "coordinates",
        coverage.with_coordinates,
        percent(coverage.with_coordinates)
    );
}
