//! Writer-reader phaser: a two-phase handshake that lets any number of writer threads record
//! into a structure wait-free while a single reader drains them with a blocking "flip".
//!
//! This is a direct port of the `WriterReaderPhaser` protocol used by the upstream Java
//! implementation to synchronize `Recorder`'s active/inactive swap, generalized here into a
//! standalone primitive so both the single- and multi-writer recorders in this crate (and any
//! other caller) can use it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crossbeam_utils::Backoff;

/// The two epoch counters for one writer-reader phaser "lane": a `start_epoch` that writers
/// fetch-and-increment on entry, and a pair of end epochs (one per phase parity) that writers
/// increment on exit. Factored out of [`Phaser`] so [`super::striped_phaser::StripedPhaser`] can
/// drive many of these under one shared reader lock.
#[derive(Debug)]
pub(crate) struct PhaserCore {
    start_epoch: AtomicI64,
    even_end_epoch: AtomicI64,
    odd_end_epoch: AtomicI64,
}

/// Opaque token returned by [`Phaser::enter`] (or [`PhaserCore::enter`]). Its sign encodes which
/// phase the critical section it guards belongs to; callers must pass it back to the matching
/// `exit` call unchanged.
#[derive(Debug, Clone, Copy)]
pub struct WriterToken(i64);

impl PhaserCore {
    pub(crate) fn new() -> PhaserCore {
        PhaserCore {
            start_epoch: AtomicI64::new(0),
            even_end_epoch: AtomicI64::new(0),
            odd_end_epoch: AtomicI64::new(i64::min_value()),
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> WriterToken {
        WriterToken(self.start_epoch.fetch_add(1, Ordering::AcqRel))
    }

    #[inline]
    pub(crate) fn exit(&self, token: WriterToken) {
        let end_epoch = if token.0 < 0 {
            &self.odd_end_epoch
        } else {
            &self.even_end_epoch
        };
        let _ = end_epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Begin a flip: reset the next phase's end epoch to its initial value and swap
    /// `start_epoch` over to it, returning `(next_phase_is_even, start_value_at_flip)`. The
    /// caller must then spin until the *previous* phase's end epoch reaches
    /// `start_value_at_flip` (see [`PhaserCore::previous_phase_caught_up`]).
    pub(crate) fn begin_flip(&self) -> (bool, i64) {
        let next_phase_is_even = self.start_epoch.load(Ordering::Acquire) < 0;
        let initial = if next_phase_is_even { 0 } else { i64::min_value() };

        let next_end_epoch = if next_phase_is_even {
            &self.even_end_epoch
        } else {
            &self.odd_end_epoch
        };
        next_end_epoch.store(initial, Ordering::Release);

        let start_value_at_flip = self.start_epoch.swap(initial, Ordering::AcqRel);
        (next_phase_is_even, start_value_at_flip)
    }

    pub(crate) fn previous_phase_caught_up(&self, next_phase_is_even: bool, target: i64) -> bool {
        let prev_end_epoch = if next_phase_is_even {
            &self.odd_end_epoch
        } else {
            &self.even_end_epoch
        };
        prev_end_epoch.load(Ordering::Acquire) == target
    }
}

/// A guard proving the reader mutex is held, required by [`Phaser::flip_phase`]. Modeling the
/// precondition this way turns what the upstream implementation checks at runtime into a
/// compile-time guarantee.
#[derive(Debug)]
pub struct ReaderLockGuard<'a> {
    _guard: std::sync::MutexGuard<'a, ()>,
}

impl<'a> ReaderLockGuard<'a> {
    pub(crate) fn new(guard: std::sync::MutexGuard<'a, ()>) -> ReaderLockGuard<'a> {
        ReaderLockGuard { _guard: guard }
    }
}

/// A single writer-reader phaser lane.
///
/// Writers call [`Phaser::enter`]/[`Phaser::exit`] around their critical section; this pair is
/// wait-free (a single atomic fetch-add on entry and exit each). A reader calls
/// [`Phaser::reader_lock`] to obtain a [`ReaderLockGuard`], then [`Phaser::flip_phase`] as many
/// times as it likes while holding it. `flip_phase` blocks until every writer that entered
/// before the flip has exited; writers that enter afterwards belong to the new phase and are not
/// waited on.
#[derive(Debug)]
pub struct Phaser {
    core: PhaserCore,
    reader_lock: Mutex<()>,
}

impl Default for Phaser {
    fn default() -> Self {
        Phaser::new()
    }
}

impl Phaser {
    /// Create a new phaser, starting in the even phase.
    pub fn new() -> Phaser {
        Phaser {
            core: PhaserCore::new(),
            reader_lock: Mutex::new(()),
        }
    }

    /// Enter a writer critical section. Wait-free: a single atomic fetch-add.
    #[inline]
    pub fn enter(&self) -> WriterToken {
        self.core.enter()
    }

    /// Exit a writer critical section previously entered with [`Phaser::enter`]. Wait-free: a
    /// single atomic fetch-add, chosen by the token's phase.
    #[inline]
    pub fn exit(&self, token: WriterToken) {
        self.core.exit(token)
    }

    /// Acquire the reader lock, serializing this reader against any other reader of the same
    /// phaser. Required before calling [`Phaser::flip_phase`].
    pub fn reader_lock(&self) -> ReaderLockGuard<'_> {
        ReaderLockGuard {
            _guard: self.reader_lock.lock().unwrap(),
        }
    }

    /// Flip to the next phase, blocking until every writer that entered before the flip has
    /// exited.
    ///
    /// Between polls of the in-flight writer count, the calling thread yields if `yield_nsec` is
    /// 0, or sleeps for `yield_nsec` nanoseconds otherwise.
    pub fn flip_phase(&self, _reader_lock: &ReaderLockGuard<'_>, yield_nsec: u64) {
        let (next_phase_is_even, start_value_at_flip) = self.core.begin_flip();

        let backoff = Backoff::new();
        while !self
            .core
            .previous_phase_caught_up(next_phase_is_even, start_value_at_flip)
        {
            if yield_nsec == 0 {
                backoff.snooze();
            } else {
                thread::sleep(Duration::from_nanos(yield_nsec));
            }
        }
    }
}
