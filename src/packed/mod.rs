//! Sparse counts backing for distributions that only populate a small fraction of their value
//! range.
//!
//! Logical slots are grouped into fixed-size pages; a page is only allocated once a value maps
//! into it, so a histogram with a huge configured range but few distinct recorded values uses
//! memory proportional to what was actually recorded rather than to the configured range. This
//! is a single level of indirection (a page table keyed by page index) rather than the full
//! multi-level trie a maximally space-efficient implementation might use -- see `DESIGN.md` for
//! why that tradeoff was made here.

use std::collections::BTreeMap;

use crate::core::layout::{self, Derivation};
use crate::errors::{CreationError, RecordError};

const PAGE_LEN: usize = 1024;

type Page = Box<[u64; PAGE_LEN]>;

fn new_page() -> Page {
    Box::new([0u64; PAGE_LEN])
}

/// A histogram whose counts are stored in demand-allocated pages rather than one contiguous
/// array, for configurations where the trackable range is far larger than the set of values
/// actually recorded.
#[derive(Debug)]
pub struct PackedHistogram {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_value_digits: u8,
    derivation: Derivation,
    len: usize,
    pages: BTreeMap<usize, Page>,
    total_count: u64,
    min_non_zero_value: u64,
    max_value: u64,
}

impl PackedHistogram {
    /// Construct a `PackedHistogram` covering `[low, high]` at `sigfig` significant decimal
    /// digits. See `Histogram::new_with_bounds` for the meaning of each parameter; the same
    /// validation rules apply.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<PackedHistogram, CreationError> {
        if low < 1 {
            return Err(CreationError::LowIsZero);
        }
        if low > u64::max_value() / 2 {
            return Err(CreationError::LowExceedsMax);
        }
        if high < 2 * low {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        if sigfig > 5 {
            return Err(CreationError::SigFigExceedsMax);
        }

        let derivation =
            Derivation::new(low, sigfig).map_err(|_| CreationError::CannotRepresentSigFigBeyondLow)?;

        let bucket_count =
            layout::buckets_needed_to_cover(high, derivation.sub_bucket_count, derivation.unit_magnitude);
        let len = layout::counts_array_length(bucket_count, derivation.sub_bucket_half_count) as usize;

        Ok(PackedHistogram {
            lowest_discernible_value: low,
            highest_trackable_value: high,
            significant_value_digits: sigfig,
            derivation,
            len,
            pages: BTreeMap::new(),
            total_count: 0,
            min_non_zero_value: u64::max_value(),
            max_value: 0,
        })
    }

    /// The lowest discernible value this histogram was configured with.
    pub fn low(&self) -> u64 {
        self.lowest_discernible_value
    }

    /// The highest trackable value this histogram was configured with.
    pub fn high(&self) -> u64 {
        self.highest_trackable_value
    }

    /// The number of significant value digits this histogram was configured with.
    pub fn sigfig(&self) -> u8 {
        self.significant_value_digits
    }

    /// Number of pages currently allocated. Proportional to the spread of distinct values
    /// recorded, not to the configured range.
    pub fn allocated_page_count(&self) -> usize {
        self.pages.len()
    }

    fn index_for(&self, value: u64) -> Option<usize> {
        let d = &self.derivation;
        let bucket_index = layout::bucket_index(value, d.sub_bucket_mask, d.leading_zero_count_base);
        let sub_bucket_index = layout::sub_bucket_index(value, bucket_index, d.unit_magnitude);
        let index = layout::counts_index(
            bucket_index,
            sub_bucket_index,
            d.sub_bucket_half_count_magnitude,
            d.sub_bucket_half_count,
        )?;
        if index < 0 {
            return None;
        }
        let index = index as usize;
        if index >= self.len {
            None
        } else {
            Some(index)
        }
    }

    fn get(&self, index: usize) -> u64 {
        let page_index = index / PAGE_LEN;
        let offset = index % PAGE_LEN;
        self.pages.get(&page_index).map_or(0, |p| p[offset])
    }

    fn add(&mut self, index: usize, n: u64) {
        let page_index = index / PAGE_LEN;
        let offset = index % PAGE_LEN;
        let page = self.pages.entry(page_index).or_insert_with(new_page);
        page[offset] += n;
    }

    /// Record a single occurrence of `value`.
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of `value`.
    pub fn record_n(&mut self, value: u64, count: u64) -> Result<(), RecordError> {
        let idx = self
            .index_for(value)
            .ok_or(RecordError::ValueOutOfRangeResizeDisabled)?;
        self.add(idx, count);
        self.total_count += count;
        if value != 0 && value < self.min_non_zero_value {
            self.min_non_zero_value = value;
        }
        if value > self.max_value {
            self.max_value = value;
        }
        Ok(())
    }

    /// The count recorded for `value`'s slot.
    pub fn count_at(&self, value: u64) -> u64 {
        self.index_for(value).map_or(0, |idx| self.get(idx))
    }

    /// Total number of recorded samples.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The highest recorded value, or 0 if nothing has been recorded.
    pub fn max(&self) -> u64 {
        self.max_value
    }

    /// The lowest recorded non-zero value, or `u64::max_value()` if nothing has been recorded.
    pub fn min_nz(&self) -> u64 {
        self.min_non_zero_value
    }

    /// Zero every count and summary, releasing all allocated pages.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.total_count = 0;
        self.min_non_zero_value = u64::max_value();
        self.max_value = 0;
    }

    /// Copy this histogram's counts and summary statistics into a freshly-built, densely-backed
    /// [`crate::Histogram`] with the same layout, for percentile/mean/stddev queries and
    /// encoding, which operate on the dense representation.
    #[cfg(feature = "serialization")]
    pub fn to_histogram(&self) -> crate::Histogram<u64> {
        let mut h = crate::Histogram::new_with_bounds(
            self.lowest_discernible_value,
            self.highest_trackable_value,
            self.significant_value_digits,
        )
        .expect("same bounds that constructed this PackedHistogram");

        for (&page_index, page) in &self.pages {
            for (offset, &n) in page.iter().enumerate() {
                if n > 0 {
                    let idx = page_index * PAGE_LEN + offset;
                    if idx < self.len {
                        h.set_count_at_index(idx, n)
                            .expect("index within this histogram's layout");
                    }
                }
            }
        }
        h.restat(self.len);
        h
    }
}
