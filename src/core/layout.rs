//! Pure bucket-index arithmetic shared by every counts backend.
//!
//! Everything here is a freestanding function over the small set of derived constants that make
//! up a histogram's layout (`sub_bucket_count`, `unit_magnitude`, etc). None of it touches a
//! counts array or any other histogram state, so it is equally usable by the dense, atomic, and
//! packed backends, and by the double-valued overlay.

/// Compute the lowest (and therefore highest precision) bucket index whose sub-buckets can
/// represent `value`.
///
/// `leading_zero_count_base` and `sub_bucket_mask` are derived once at construction time (see
/// [`derive`]).
#[inline]
pub fn bucket_index(value: u64, sub_bucket_mask: u64, leading_zero_count_base: u8) -> u8 {
    leading_zero_count_base - (value | sub_bucket_mask).leading_zeros() as u8
}

/// Compute the position inside `bucket_index`'s bucket at which `value` should be recorded.
#[inline]
pub fn sub_bucket_index(value: u64, bucket_index: u8, unit_magnitude: u8) -> u32 {
    (value >> (bucket_index + unit_magnitude)) as u32
}

/// Compute the value corresponding to a `(bucket_index, sub_bucket_index)` location.
#[inline]
pub fn value_from_location(bucket_index: u8, sub_bucket_index: u32, unit_magnitude: u8) -> u64 {
    u64::from(sub_bucket_index) << (bucket_index + unit_magnitude)
}

/// Compute the logical counts-array index for a `(bucket_index, sub_bucket_index)` location, or
/// `None` if it overflows `i32`/`usize`.
#[inline]
pub fn counts_index(
    bucket_index: u8,
    sub_bucket_index: u32,
    sub_bucket_half_count_magnitude: u8,
    sub_bucket_half_count: u32,
) -> Option<i64> {
    // Index of the first slot used in this bucket (halfway through sub_bucket_count).
    let bucket_base_index = (i64::from(bucket_index) + 1) << sub_bucket_half_count_magnitude;
    let offset_in_bucket = i64::from(sub_bucket_index) - i64::from(sub_bucket_half_count);
    Some(bucket_base_index + offset_in_bucket)
}

/// Find the number of buckets needed such that `value` is representable, given the (power of
/// two) `sub_bucket_count` and `unit_magnitude` of the layout.
pub fn buckets_needed_to_cover(value: u64, sub_bucket_count: u32, unit_magnitude: u8) -> u8 {
    // the k'th bucket can express from 0*2^k to sub_bucket_count*2^k in units of 2^k
    let mut smallest_untrackable_value = u64::from(sub_bucket_count) << unit_magnitude;

    let mut buckets_needed = 1;
    while smallest_untrackable_value <= value {
        if smallest_untrackable_value > u64::max_value() / 2 {
            return buckets_needed + 1;
        }
        smallest_untrackable_value <<= 1;
        buckets_needed += 1;
    }
    buckets_needed
}

/// Compute the number of counts-array slots needed to hold `bucket_count` buckets, given
/// `sub_bucket_half_count`.
pub fn counts_array_length(bucket_count: u8, sub_bucket_half_count: u32) -> u32 {
    (u32::from(bucket_count) + 1) * sub_bucket_half_count
}

/// Derived, immutable layout constants for a given `(lowest_discernible_value,
/// highest_trackable_value, significant_value_digits)` triple. These are the values every
/// counts backend (dense, atomic, packed) needs in order to use the free functions above; they
/// are recomputed on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    /// Largest exponent of 2 that's smaller than the lowest discernible value.
    pub unit_magnitude: u8,
    /// Low `unit_magnitude` bits set.
    pub unit_magnitude_mask: u64,
    /// Smallest power of two at least `2 * 10^sigfig`.
    pub sub_bucket_count: u32,
    /// `sub_bucket_count / 2`.
    pub sub_bucket_half_count: u32,
    /// `log2(sub_bucket_half_count)`.
    pub sub_bucket_half_count_magnitude: u8,
    /// The bottom sub-bucket's bits set, shifted by `unit_magnitude`.
    pub sub_bucket_mask: u64,
    /// Number of leading zeros used by the largest value in bucket 0.
    pub leading_zero_count_base: u8,
}

/// Errors that can occur deriving a layout from a `(low, high, sigfig)` triple.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum DerivationError {
    /// `sigfig` must be in `[0, 5]`.
    SigFigExceedsMax,
    /// The derived `sub_bucket_count`, shifted by `unit_magnitude`, doesn't fit in a `u64`.
    CannotRepresentSigFigBeyondLow,
}

impl Derivation {
    /// Derive the layout constants for the given lowest discernible value and significant
    /// digits. Does not validate `low`/`sigfig` range relationships beyond what's needed to
    /// avoid overflow; callers (e.g. `Histogram::new_with_bounds`) perform the full argument
    /// validation.
    pub fn new(low: u64, sigfig: u8) -> Result<Derivation, DerivationError> {
        if sigfig > 5 {
            return Err(DerivationError::SigFigExceedsMax);
        }

        // largest value with single unit resolution, in [2, 200_000].
        let largest = 2 * 10_u32.pow(u32::from(sigfig));

        let unit_magnitude = (low as f64).log2().floor() as u8;
        let unit_magnitude_mask = (1 << unit_magnitude) - 1;

        let sub_bucket_count_magnitude = (f64::from(largest)).log2().ceil() as u8;
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude - 1;
        let sub_bucket_count = 1_u32 << u32::from(sub_bucket_count_magnitude);

        if unit_magnitude + sub_bucket_count_magnitude > 63 {
            return Err(DerivationError::CannotRepresentSigFigBeyondLow);
        }

        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_mask = (u64::from(sub_bucket_count) - 1) << unit_magnitude;

        Ok(Derivation {
            unit_magnitude,
            unit_magnitude_mask,
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_half_count_magnitude,
            sub_bucket_mask,
            leading_zero_count_base: 64 - unit_magnitude - sub_bucket_count_magnitude,
        })
    }
}
