//! Auto-ranging floating point overlay atop an integer-valued [`Histogram`].
//!
//! A `DoubleHistogram` does not store floating point values directly. Instead it keeps a plain
//! integer histogram plus a single conversion ratio `R`, and stores a double `x` as the integer
//! `round(x / R)`. When a sample no longer fits the current `R` -- either because it would
//! overflow the integer histogram's top, or because it's too small to round to a nonzero integer
//! at the current resolution -- `R` is shifted by a power of two and the integer histogram's
//! existing contents are shifted to match, using [`Histogram::shift_values_left`] /
//! [`Histogram::shift_values_right`] so the already-recorded values keep their original meaning.
//! This keeps the integer histogram as the single source of truth; every double-facing method
//! here is a thin scaling wrapper around it.

use crate::errors::{CreationError, RecordError};
use crate::Histogram;

/// An auto-ranging histogram of non-negative `f64` values.
#[derive(Debug)]
pub struct DoubleHistogram {
    integer_values_histogram: Histogram<u64>,
    highest_to_lowest_value_ratio: u64,
    integer_to_double_value_conversion_ratio: f64,
}

impl DoubleHistogram {
    /// Construct a new `DoubleHistogram` able to track values whose ratio (`max / min`, for any
    /// two non-zero values recorded concurrently) does not exceed `highest_to_lowest_value_ratio`,
    /// at `significant_value_digits` significant decimal digits.
    pub fn new(
        highest_to_lowest_value_ratio: u64,
        significant_value_digits: u8,
    ) -> Result<DoubleHistogram, CreationError> {
        if highest_to_lowest_value_ratio < 2 {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        let internal_high = highest_to_lowest_value_ratio
            .checked_mul(2)
            .ok_or(CreationError::LowExceedsMax)?;
        let integer_values_histogram = Histogram::new_with_bounds(1, internal_high, significant_value_digits)?;

        Ok(DoubleHistogram {
            integer_values_histogram,
            highest_to_lowest_value_ratio,
            integer_to_double_value_conversion_ratio: 1.0,
        })
    }

    /// The configured dynamic range: the largest ratio between any two non-zero values this
    /// histogram can hold at once.
    pub fn highest_to_lowest_value_ratio(&self) -> u64 {
        self.highest_to_lowest_value_ratio
    }

    /// The current integer-to-double conversion ratio `R`. Exposed mainly for testing and
    /// diagnostics; it changes over time as recorded values drive auto-ranging shifts.
    pub fn current_conversion_ratio(&self) -> f64 {
        self.integer_to_double_value_conversion_ratio
    }

    fn to_integer_value(&self, value: f64) -> u64 {
        (value / self.integer_to_double_value_conversion_ratio).round() as u64
    }

    fn to_double_value(&self, value: u64) -> f64 {
        value as f64 * self.integer_to_double_value_conversion_ratio
    }

    /// Widen or narrow `R` (shifting the underlying integer histogram to compensate) until
    /// `value` both fits under the integer histogram's trackable maximum and rounds to a nonzero
    /// integer at the current resolution.
    fn make_room_for(&mut self, value: f64) -> Result<(), RecordError> {
        while self.to_integer_value(value) > self.integer_values_histogram.high() {
            // R doubles, so every existing stored integer must halve to keep `stored * R`
            // unchanged: shift the integer histogram right, not left.
            self.integer_values_histogram
                .shift_values_right(1)
                .map_err(|_| RecordError::ValueOutOfRangeResizeDisabled)?;
            self.integer_to_double_value_conversion_ratio *= 2.0;
        }
        while value > 0.0 && self.to_integer_value(value) == 0 {
            // R halves, so every existing stored integer must double to keep `stored * R`
            // unchanged: shift the integer histogram left, not right.
            self.integer_values_histogram
                .shift_values_left(1)
                .map_err(|_| RecordError::ValueOutOfRangeResizeDisabled)?;
            self.integer_to_double_value_conversion_ratio /= 2.0;
        }
        Ok(())
    }

    /// Record `value`, which must be non-negative.
    pub fn record_value(&mut self, value: f64) -> Result<(), RecordError> {
        self.record_value_with_count(value, 1)
    }

    /// Record `value` `count` times.
    pub fn record_value_with_count(&mut self, value: f64, count: u64) -> Result<(), RecordError> {
        if value < 0.0 || !value.is_finite() {
            return Err(RecordError::ValueOutOfRangeResizeDisabled);
        }
        if value > 0.0 {
            self.make_room_for(value)?;
        }
        let scaled = self.to_integer_value(value);
        self.integer_values_histogram.record_n(scaled, count)
    }

    /// Record `value`, correcting for coordinated omission by synthesizing additional records at
    /// decreasing multiples of `expected_interval`. See
    /// [`Histogram::record_n_correct`] for the correction this performs on the underlying
    /// integer histogram.
    pub fn record_value_with_expected_interval(
        &mut self,
        value: f64,
        expected_interval: f64,
    ) -> Result<(), RecordError> {
        if value < 0.0 || !value.is_finite() {
            return Err(RecordError::ValueOutOfRangeResizeDisabled);
        }
        if value > 0.0 {
            self.make_room_for(value)?;
        }
        let scaled_value = self.to_integer_value(value);
        let scaled_interval = self.to_integer_value(expected_interval.max(0.0));
        self.integer_values_histogram
            .record_n_correct(scaled_value, 1, scaled_interval)
    }

    /// Total number of recorded samples.
    pub fn total_count(&self) -> u64 {
        self.integer_values_histogram.count()
    }

    /// The lowest recorded, non-zero value.
    pub fn min_nz(&self) -> f64 {
        self.to_double_value(self.integer_values_histogram.min_nz())
    }

    /// The highest recorded value.
    pub fn max(&self) -> f64 {
        self.to_double_value(self.integer_values_histogram.max())
    }

    /// Arithmetic mean of all recorded values.
    pub fn mean(&self) -> f64 {
        self.integer_values_histogram.mean() * self.integer_to_double_value_conversion_ratio
    }

    /// Standard deviation of all recorded values.
    pub fn stdev(&self) -> f64 {
        self.integer_values_histogram.stdev() * self.integer_to_double_value_conversion_ratio
    }

    /// The value at the given percentile (0.0-100.0), subject to this histogram's resolution.
    pub fn value_at_percentile(&self, percentile: f64) -> f64 {
        self.to_double_value(self.integer_values_histogram.value_at_percentile(percentile))
    }

    /// The count of samples recorded for `value`, accounting for equivalent-value rounding.
    pub fn count_at(&self, value: f64) -> u64 {
        self.integer_values_histogram.count_at(self.to_integer_value(value))
    }

    /// Zero all counts and summary statistics. Does not reset `R` back to its initial value,
    /// since doing so would require re-deriving it from nothing recorded.
    pub fn reset(&mut self) {
        self.integer_values_histogram.reset();
    }
}
