//! A multi-writer-safe recorder that hands out point-in-time interval snapshots without ever
//! blocking a writer on a reader.
//!
//! Writers call [`Recorder::record`] (or the coordinated-omission-correcting variants) from any
//! number of threads. A single reader periodically calls [`Recorder::get_interval_histogram`] to
//! atomically swap in a fresh active buffer and receive the previous interval's contents as a
//! plain, queryable [`crate::Histogram`]. This mirrors the upstream Java `Recorder`'s
//! active/inactive double-buffering protocol, but is built on one [`AtomicHistogram`] per buffer
//! rather than on unsynchronized mutable state guarded only by a phaser: Rust's aliasing rules
//! don't admit the Java version's "plain field access coordinated purely by a memory-barrier
//! handshake" trick, so every writer touches the active buffer through atomics instead. See
//! `DESIGN.md` for the full rationale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use super::atomic_histogram::AtomicHistogram;
use super::phaser::Phaser;
use crate::errors::{CreationError, RecordError, RecorderError};
use crate::Histogram;

static NEXT_RECORDER_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// A histogram snapshot produced by [`Recorder::get_interval_histogram`].
///
/// Derefs to the underlying [`Histogram<u64>`] for querying. Pass a previously-obtained
/// `IntervalHistogram` back into `get_interval_histogram` to let the recorder recycle its
/// allocation for the next interval instead of allocating a new one.
#[derive(Debug)]
pub struct IntervalHistogram {
    histogram: Histogram<u64>,
    containing_instance_id: u64,
}

impl IntervalHistogram {
    /// The id of the [`Recorder`] that produced this snapshot. Recycling a snapshot back into a
    /// different recorder is rejected; this is how that's detected.
    pub fn containing_instance_id(&self) -> u64 {
        self.containing_instance_id
    }
}

impl std::ops::Deref for IntervalHistogram {
    type Target = Histogram<u64>;

    fn deref(&self) -> &Histogram<u64> {
        &self.histogram
    }
}

impl std::ops::DerefMut for IntervalHistogram {
    fn deref_mut(&mut self) -> &mut Histogram<u64> {
        &mut self.histogram
    }
}

/// A multi-writer histogram recorder.
///
/// Construct one, share it (typically behind an `Arc`) with every writer thread, and have a
/// single collector thread periodically call [`Recorder::get_interval_histogram`] to pull out
/// what was recorded since the last call.
#[derive(Debug)]
pub struct Recorder {
    instance_id: u64,
    active: ArcSwap<AtomicHistogram>,
    inactive: Mutex<Option<Arc<AtomicHistogram>>>,
    phaser: Phaser,
}

impl Recorder {
    /// Construct a new recorder covering `[low, high]` at `sigfig` significant decimal digits.
    pub fn new(low: u64, high: u64, sigfig: u8) -> Result<Recorder, CreationError> {
        let active = AtomicHistogram::new_with_bounds(low, high, sigfig)?;
        let inactive = AtomicHistogram::new_from(&active);

        Ok(Recorder {
            instance_id: NEXT_RECORDER_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            active: ArcSwap::from_pointee(active),
            inactive: Mutex::new(Some(Arc::new(inactive))),
            phaser: Phaser::new(),
        })
    }

    /// Record `value` once.
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of `value`.
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), RecordError> {
        let token = self.phaser.enter();
        let result = self.active.load().record_n(value, count);
        self.phaser.exit(token);
        result
    }

    /// Record `value` once, correcting for coordinated omission by synthesizing additional
    /// records at decreasing multiples of `interval` down to (but not including) `value` itself.
    ///
    /// See [`Histogram::record_n_correct`] for the correction algorithm; this performs the same
    /// synthesis, but the whole burst happens inside one phaser critical section so a concurrent
    /// flip either sees all of it or none of it.
    pub fn record_correct(&self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n_correct(value, 1, interval)
    }

    /// Record `count` occurrences of `value`, correcting for coordinated omission. See
    /// [`Recorder::record_correct`].
    pub fn record_n_correct(&self, value: u64, count: u64, interval: u64) -> Result<(), RecordError> {
        let token = self.phaser.enter();
        let result = (|| {
            let active = self.active.load();
            active.record_n(value, count)?;
            if interval > 0 && value > interval {
                let mut missing_value = value - interval;
                while missing_value >= interval {
                    active.record_n(missing_value, count)?;
                    missing_value -= interval;
                }
            }
            Ok(())
        })();
        self.phaser.exit(token);
        result
    }

    /// Swap in a fresh active buffer and return the previous interval's recordings as a
    /// [`Histogram<u64>`] snapshot.
    ///
    /// If `to_recycle` is `Some`, its backing allocation is reused for the *next* call's active
    /// buffer instead of allocating a fresh one, provided it was produced by this same recorder;
    /// otherwise [`RecorderError::InvalidRecycledHistogram`] is returned and `to_recycle` is
    /// dropped.
    ///
    /// Blocks briefly (see `flip_phase`) for any writer that was already in its critical section
    /// when this call started, but never blocks on a writer that starts afterwards.
    pub fn get_interval_histogram(
        &self,
        to_recycle: Option<IntervalHistogram>,
    ) -> Result<IntervalHistogram, RecorderError> {
        if let Some(ref recycled) = to_recycle {
            if recycled.containing_instance_id != self.instance_id {
                return Err(RecorderError::InvalidRecycledHistogram);
            }
        }

        let mut inactive_guard = self.inactive.lock().unwrap();
        let next_active = inactive_guard
            .take()
            .unwrap_or_else(|| Arc::new(AtomicHistogram::new_from(&self.active.load())));
        next_active.reset();

        let reader_lock = self.phaser.reader_lock();
        let previous_active = self.active.swap(next_active);
        self.phaser.flip_phase(&reader_lock, 500_000);
        drop(reader_lock);

        let histogram = match to_recycle {
            Some(recycled) => {
                let mut histogram = recycled.histogram;
                previous_active.drain_into(&mut histogram);
                histogram
            }
            None => previous_active.to_histogram(),
        };

        *inactive_guard = Some(previous_active);
        drop(inactive_guard);

        Ok(IntervalHistogram {
            histogram,
            containing_instance_id: self.instance_id,
        })
    }
}
