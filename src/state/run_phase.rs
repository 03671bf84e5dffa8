//! Run phase definitions for tracking crawl progress

use crate::HarvestError;
use std::fmt;

/// Phases of a crawl run
///
/// A run moves strictly forward:
/// `Sampling -> Crawling -> Aggregated -> Output`. Index pages are processed
/// one after another while the run is `Crawling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Choosing which index pages to visit
    Sampling,

    /// Visiting sampled index pages and their detail pages
    Crawling,

    /// The accumulator is final; no more records will be added
    Aggregated,

    /// Records are being written to their output files
    Output,
}

impl RunPhase {
    /// Returns the phase that follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Sampling => Some(Self::Crawling),
            Self::Crawling => Some(Self::Aggregated),
            Self::Aggregated => Some(Self::Output),
            Self::Output => None,
        }
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Moves to `to`, rejecting anything but the immediate successor
    pub fn transition(self, to: Self) -> Result<Self, HarvestError> {
        if self.can_transition_to(to) {
            tracing::debug!("Run phase {} -> {}", self, to);
            Ok(to)
        } else {
            Err(HarvestError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sampling => "sampling",
            Self::Crawling => "crawling",
            Self::Aggregated => "aggregated",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
