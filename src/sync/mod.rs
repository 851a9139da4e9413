//! Synchronized types that allow access to a histogram from multiple threads.
//!
//! [`Phaser`] and [`StripedPhaser`] are the low-level writer-reader coordination primitives;
//! [`AtomicHistogram`] is a fixed-range, multi-writer-safe counts backing; [`Recorder`] combines
//! both into a ready-to-use double-buffered recorder with an interval-snapshot API.

pub(crate) mod atomic_histogram;
pub(crate) mod phaser;
pub(crate) mod recorder;
pub(crate) mod striped_phaser;

pub use atomic_histogram::AtomicHistogram;
pub use phaser::{Phaser, ReaderLockGuard, WriterToken};
pub use recorder::{IntervalHistogram, Recorder};
pub use striped_phaser::{StripedPhaser, StripedWriterToken, DEFAULT_STRIPE_COUNT};
