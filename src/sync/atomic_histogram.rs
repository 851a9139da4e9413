//! A dense, fixed-range counts backing whose slots, running total, and min/max summaries can be
//! updated from any number of threads concurrently through a shared reference, built directly on
//! `core::layout`'s index arithmetic rather than on `Histogram<T>`'s `Vec<T>` backing.
//!
//! Unlike `Histogram<T>`, this type does not auto-resize: extending the counts array while other
//! threads may be mid-increment would require either a full structural lock around every record
//! (defeating the point) or unsafe aliasing, so this backing is reserved for configurations with
//! a known upper bound. See `DESIGN.md` for the reasoning.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::layout::{self, Derivation};
use crate::errors::{CreationError, RecordError};

/// A multi-writer-safe histogram with a fixed value range, used as the active buffer inside
/// [`super::recorder::Recorder`].
#[derive(Debug)]
pub struct AtomicHistogram {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_value_digits: u8,
    derivation: Derivation,
    counts: Vec<AtomicU64>,
    total_count: AtomicU64,
    min_non_zero_value: AtomicU64,
    max_value: AtomicU64,
}

impl AtomicHistogram {
    /// Construct an `AtomicHistogram` covering `[low, high]` at `sigfig` significant decimal
    /// digits. See `Histogram::new_with_bounds` for the meaning of each parameter; the same
    /// validation rules apply.
    pub fn new_with_bounds(
        low: u64,
        high: u64,
        sigfig: u8,
    ) -> Result<AtomicHistogram, CreationError> {
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

        let mut counts = Vec::with_capacity(len);
        counts.resize_with(len, || AtomicU64::new(0));

        Ok(AtomicHistogram {
            lowest_discernible_value: low,
            highest_trackable_value: high,
            significant_value_digits: sigfig,
            derivation,
            counts,
            total_count: AtomicU64::new(0),
            min_non_zero_value: AtomicU64::new(u64::max_value()),
            max_value: AtomicU64::new(0),
        })
    }

    /// Construct a fresh, empty `AtomicHistogram` with the same range settings as `other`.
    pub fn new_from(other: &AtomicHistogram) -> AtomicHistogram {
        AtomicHistogram::new_with_bounds(
            other.lowest_discernible_value,
            other.highest_trackable_value,
            other.significant_value_digits,
        )
        .expect("source histogram's bounds were already validated")
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
        if index >= self.counts.len() {
            None
        } else {
            Some(index)
        }
    }

    /// Record a single occurrence of `value`. Wait-free: one atomic fetch-add on the slot, one
    /// on the running total, plus a bounded CAS loop to update the min/max summaries.
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of `value`.
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), RecordError> {
        let idx = self
            .index_for(value)
            .ok_or(RecordError::ValueOutOfRangeResizeDisabled)?;
        let _ = self.counts[idx].fetch_add(count, Ordering::Relaxed);
        let _ = self.total_count.fetch_add(count, Ordering::Relaxed);
        self.update_min_max(value);
        Ok(())
    }

    fn update_min_max(&self, value: u64) {
        if value != 0 {
            let mut observed = self.min_non_zero_value.load(Ordering::Relaxed);
            while value < observed {
                match self.min_non_zero_value.compare_exchange_weak(
                    observed,
                    value,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(actual) => observed = actual,
                }
            }
        }

        let mut observed = self.max_value.load(Ordering::Relaxed);
        while value > observed {
            match self.max_value.compare_exchange_weak(
                observed,
                value,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => observed = actual,
            }
        }
    }

    /// Zero every count and summary, preserving layout. Not safe to call while another thread
    /// may be mid-record against the same slots; callers (the recorder) only reset a buffer that
    /// has already been drained of in-flight writers by a phaser flip.
    pub fn reset(&self) {
        for c in &self.counts {
            c.store(0, Ordering::Relaxed);
        }
        self.total_count.store(0, Ordering::Relaxed);
        self.min_non_zero_value.store(u64::max_value(), Ordering::Relaxed);
        self.max_value.store(0, Ordering::Relaxed);
    }

    /// Total number of recorded samples.
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Copy this histogram's counts and summary statistics into a freshly-built
    /// non-concurrent [`crate::Histogram`] with the same layout, for querying and encoding.
    #[cfg(feature = "serialization")]
    pub fn to_histogram(&self) -> crate::Histogram<u64> {
        let mut h = crate::Histogram::new_with_bounds(
            self.lowest_discernible_value,
            self.highest_trackable_value,
            self.significant_value_digits,
        )
        .expect("same bounds that constructed this AtomicHistogram");
        self.drain_into(&mut h);
        h
    }

    /// Copy this histogram's counts into `target`, which must share this histogram's layout
    /// (same low/high/sigfig), and recompute its summary statistics. `target`'s prior contents
    /// are discarded.
    #[cfg(feature = "serialization")]
    pub fn drain_into(&self, target: &mut crate::Histogram<u64>) {
        target.reset();
        let mut highest_nonzero = 0;
        for (idx, c) in self.counts.iter().enumerate() {
            let n = c.load(Ordering::Relaxed);
            if n > 0 {
                target
                    .set_count_at_index(idx, n)
                    .expect("target shares this histogram's layout");
                highest_nonzero = idx + 1;
            }
        }
        target.restat(highest_nonzero);
    }
}
