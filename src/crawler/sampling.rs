//! Seeded selection of index pages
//!
//! Pages are drawn without replacement so the crawl covers a spread of the
//! listing instead of only its most popular first pages.

use crate::ConfigError;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The index page numbers selected for one run
///
/// Numbers are 1-based, distinct, and kept in draw order. The same
/// `(max_pages, sample_size, seed)` always yields the same sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledPageIndex {
    pages: Vec<u32>,
    seed: u64,
}

impl SampledPageIndex {
    /// Draws `sample_size` distinct page numbers from `1..=max_pages`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SampleTooLarge`] when `sample_size` exceeds
    /// `max_pages`.
    pub fn draw(max_pages: u32, sample_size: u32, seed: u64) -> Result<Self, ConfigError> {
        if sample_size > max_pages {
            return Err(ConfigError::SampleTooLarge {
                requested: sample_size,
                available: max_pages,
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let pages = rand::seq::index::sample(&mut rng, max_pages as usize, sample_size as usize)
            .into_iter()
            .map(|index| index as u32 + 1)
            .collect();

        Ok(Self { pages, seed })
    }

    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_size_and_range() {
        let sample = SampledPageIndex::draw(1000, 500, 41).unwrap();
        assert_eq!(sample.len(), 500);
        assert!(sample.iter().all(|page| (1..=1000).contains(&page)));
    }

    #[test]
    fn test_sample_is_distinct() {
        let sample = SampledPageIndex::draw(50, 50, 7).unwrap();
        let unique: HashSet<u32> = sample.iter().collect();
        assert_eq!(unique.len(), 50);
        assert_eq!(unique, (1..=50).collect::<HashSet<u32>>());
    }

    #[test]
    fn test_same_seed_same_sample() {
        let first = SampledPageIndex::draw(1000, 20, 41).unwrap();
        let second = SampledPageIndex::draw(1000, 20, 41).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_different_sample() {
        let first = SampledPageIndex::draw(1000, 20, 41).unwrap();
        let second = SampledPageIndex::draw(1000, 20, 42).unwrap();
        assert_ne!(first.pages(), second.pages());
    }

    #[test]
    fn test_empty_sample() {
        let sample = SampledPageIndex::draw(1000, 0, 41).unwrap();
        assert!(sample.is_empty());
    }

    #[test]
    fn test_oversized_sample_rejected() {
        let result = SampledPageIndex::draw(10, 11, 41);
        assert!(matches!(
            result,
            Err(ConfigError::SampleTooLarge {
                requested: 11,
                available: 10
            })
        ));
    }
}
