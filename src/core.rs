//! The `AcquireReleaser` handshake: the single shared abstraction every
//! queue shape in this crate is built on. Nothing in here knows about
//! chunks, headers, or wrap-fixup — that belongs to the queue-specific
//! layer above it.
//!
//! # Memory ordering & synchronization strategy
//!
//! Each side (`producer`, `consumer`) publishes how far it has advanced
//! through a [`Cursor`]'s `released` counter, an unbounded (never taken
//! modulo the ring size except for indexing) signed 64-bit count:
//!
//! - Own `released`: loaded `Relaxed` (only this side ever writes it).
//! - `cached_opposite`: private, `UnsafeCell`, single-writer — no ordering
//!   needed to read or write it.
//! - If the cache isn't enough to satisfy a claim: load the *opposite*
//!   side's `released` with `Acquire`, synchronizing with its last
//!   `release()`.
//! - Publish a claim: `fetch_add` into `released` with `Release` (or a
//!   relaxed store for `release_lazy`, see below).
//!
//! `i64` throughout (not `u64`): `acquire_from = released - offset` is
//! transiently negative before either side has advanced, and comparisons
//! against `cached_opposite` need to stay correct across that, exactly as
//! in the original's `int64` arithmetic. [`crate::config::MAX_SIZE`] keeps
//! this comfortably within range.

use crate::invariants::{debug_assert_capacity_bound, debug_assert_claim_within_ring, debug_assert_released_monotonic};
use crate::tick;
use crossbeam_utils::CachePadded;
use std::cell::Cell;
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// One side's private view of the handshake plus its published position.
pub(crate) struct Cursor {
    released: CachePadded<AtomicI64>,
    cached_opposite: UnsafeCell<i64>,
    unreleased: Cell<i64>,
    failed: AtomicU64,
}

impl Cursor {
    fn new() -> Self {
        Self {
            released: CachePadded::new(AtomicI64::new(0)),
            cached_opposite: UnsafeCell::new(0),
            unreleased: Cell::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn released(&self) -> i64 {
        self.released.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn fmt(&self, f: &mut fmt::Formatter<'_>, name: &str, mask: i64) -> fmt::Result {
        let released = self.released();
        // SAFETY: debug formatting only ever runs from the owning side's
        // thread in practice (it's reached through that side's handle).
        let cached = unsafe { *self.cached_opposite.get() };
        write!(
            f,
            "{{{name}, released {released}({}), unreleased {}, failed {}, cached {cached}({}) }}",
            released & mask,
            self.unreleased.get(),
            self.failed(),
            cached & mask,
        )
    }
}

/// The shared handshake at the heart of every queue in this crate: two
/// [`Cursor`]s, each reading the other's `released` counter, that never
/// touch ring contents themselves — only the claimed `[from, to)` ranges
/// they hand back.
pub(crate) struct SpscCore {
    size: i64,
    mask: i64,
    pause_ticks: i64,
    producer: Cursor,
    consumer: Cursor,
}

// SAFETY: the only state shared across threads is the two `released`
// atomics (and `failed`, a relaxed diagnostic counter); everything else is
// private to whichever side's Cell/UnsafeCell it belongs to, a discipline
// enforced by this module's API (producer_* methods only ever touch
// `self.producer`, consumer_* only ever touch `self.consumer`).
unsafe impl Sync for SpscCore {}

impl SpscCore {
    pub(crate) fn new(size: i64, pause_ticks: i64) -> Self {
        Self { size, mask: size - 1, pause_ticks, producer: Cursor::new(), consumer: Cursor::new() }
    }

    pub(crate) fn size(&self) -> i64 {
        self.size
    }

    pub(crate) fn mask(&self) -> i64 {
        self.mask
    }

    pub(crate) fn failed_writes(&self) -> u64 {
        self.producer.failed()
    }

    pub(crate) fn failed_reads(&self) -> u64 {
        self.consumer.failed()
    }

    pub(crate) fn producer_released(&self) -> i64 {
        self.producer.released()
    }

    pub(crate) fn consumer_released(&self) -> i64 {
        self.consumer.released()
    }

    // -- the handshake itself, parameterized by which side is "own" --

    fn try_reserve(&self, own: &Cursor, opposite: &Cursor, offset: i64, request: i64) -> bool {
        let released = own.released();
        let acquire_from = released - offset;
        let acquire_to = acquire_from + request;
        // SAFETY: only the side that owns `own` ever calls this.
        let mut cached = unsafe { *own.cached_opposite.get() };
        if acquire_to > cached {
            cached = opposite.released.load(Ordering::Acquire);
            unsafe {
                *own.cached_opposite.get() = cached;
            }
            if acquire_to > cached {
                own.failed.fetch_add(1, Ordering::Relaxed);
                own.unreleased.set(0);
                tick::pause(self.pause_ticks);
                return false;
            }
        }
        own.unreleased.set(request);
        true
    }

    /// May shrink `request`: either the physical ring end or the opposite
    /// side's published watermark limits it. Returns `(0, 0)` only when no
    /// bytes at all are available.
    fn acquire_up_to(&self, own: &Cursor, opposite: &Cursor, offset: i64, mut request: i64) -> (i64, i64) {
        let released = own.released();
        let acquire_from = released - offset;
        let acquire_to_wanted = acquire_from + request;
        // SAFETY: only the side that owns `own` ever calls this.
        let mut cached = unsafe { *own.cached_opposite.get() };
        if acquire_to_wanted > cached {
            cached = opposite.released.load(Ordering::Acquire);
            unsafe {
                *own.cached_opposite.get() = cached;
            }
            if acquire_to_wanted > cached {
                request = cached - acquire_from;
                if request <= 0 {
                    own.failed.fetch_add(1, Ordering::Relaxed);
                    own.unreleased.set(0);
                    tick::pause(self.pause_ticks);
                    return (0, 0);
                }
            }
        }
        let from = released & self.mask;
        let to = (from + request).min(self.size);
        own.unreleased.set(to - from);
        debug_assert_claim_within_ring!(from, to, self.size);
        (from, to)
    }

    /// Never shrinks: either returns exactly `request` bytes, or `(0, 0)`
    /// with no partial claim. When the naive `from + request` would cross
    /// the physical ring end, the returned range is rebased to start at
    /// physical offset 0 — the caller is expected to have folded whatever
    /// is wasted at the tail into `request` (see [`crate::msg_queue`]).
    fn acquire_exactly(&self, own: &Cursor, opposite: &Cursor, offset: i64, request: i64) -> (i64, i64) {
        if !self.try_reserve(own, opposite, offset, request) {
            return (0, 0);
        }
        let released = own.released();
        let from = released & self.mask;
        let end = from + request;
        let (from, to) = if end > self.size { (0, end - self.size) } else { (from, end) };
        debug_assert_claim_within_ring!(from, to, self.size);
        (from, to)
    }

    /// Like `acquire_exactly`, but for claims that genuinely span the
    /// physical wrap with real data on both sides (as opposed to
    /// `ByteMsgQ`'s "pad with a skip header on one side" wrap). Returns
    /// `(from, first_segment_len, wrap_segment_len)`.
    fn claim_wrapping(&self, own: &Cursor, opposite: &Cursor, offset: i64, request: i64) -> Option<(i64, i64, i64)> {
        if !self.try_reserve(own, opposite, offset, request) {
            return None;
        }
        let released = own.released();
        let from = released & self.mask;
        let first = request.min(self.size - from);
        let wrap = request - first;
        Some((from, first, wrap))
    }

    /// Records a failed claim attempt without touching `unreleased` or
    /// `released` -- for callers that detect "nothing to claim yet" from
    /// queue-specific state (e.g. an unwritten `ByteMsgQ` header) before
    /// they'd otherwise call `acquire_exactly` with a request of `0`, which
    /// would trivially succeed instead of reporting a failure.
    fn record_failed(&self, own: &Cursor) {
        own.failed.fetch_add(1, Ordering::Relaxed);
        tick::pause(self.pause_ticks);
    }

    fn release(&self, own: &Cursor) {
        let n = own.unreleased.get();
        let prev = own.released();
        own.released.fetch_add(n, Ordering::Release);
        own.unreleased.set(0);
        debug_assert_released_monotonic!("release", prev, prev + n);
    }

    fn release_lazy(&self, own: &Cursor) {
        let n = own.unreleased.get();
        let prev = own.released.load(Ordering::Relaxed);
        own.released.store(prev + n, Ordering::Relaxed);
        own.unreleased.set(0);
        debug_assert_released_monotonic!("release_lazy", prev, prev + n);
    }

    fn claim_range(&self, own: &Cursor) -> (i64, i64) {
        let released = own.released();
        let from = released & self.mask;
        (from, from + own.unreleased.get())
    }

    // -- producer-facing --

    pub(crate) fn producer_acquire_up_to(&self, request: i64) -> (i64, i64) {
        self.acquire_up_to(&self.producer, &self.consumer, self.size, request)
    }

    pub(crate) fn producer_acquire_exactly(&self, request: i64) -> (i64, i64) {
        self.acquire_exactly(&self.producer, &self.consumer, self.size, request)
    }

    pub(crate) fn producer_claim_wrapping(&self, request: i64) -> Option<(i64, i64, i64)> {
        self.claim_wrapping(&self.producer, &self.consumer, self.size, request)
    }

    pub(crate) fn producer_release(&self) {
        self.release(&self.producer);
        debug_assert_capacity_bound!(self.producer.released(), self.consumer.released(), self.size);
    }

    pub(crate) fn producer_release_lazy(&self) {
        self.release_lazy(&self.producer);
        debug_assert_capacity_bound!(self.producer.released(), self.consumer.released(), self.size);
    }

    pub(crate) fn producer_claim_range(&self) -> (i64, i64) {
        self.claim_range(&self.producer)
    }

    // -- consumer-facing --

    pub(crate) fn consumer_acquire_up_to(&self, request: i64) -> (i64, i64) {
        self.acquire_up_to(&self.consumer, &self.producer, 0, request)
    }

    pub(crate) fn consumer_acquire_exactly(&self, request: i64) -> (i64, i64) {
        self.acquire_exactly(&self.consumer, &self.producer, 0, request)
    }

    pub(crate) fn consumer_claim_wrapping(&self, request: i64) -> Option<(i64, i64, i64)> {
        self.claim_wrapping(&self.consumer, &self.producer, 0, request)
    }

    pub(crate) fn consumer_release(&self) {
        self.release(&self.consumer);
    }

    pub(crate) fn consumer_release_lazy(&self) {
        self.release_lazy(&self.consumer);
    }

    pub(crate) fn consumer_claim_range(&self) -> (i64, i64) {
        self.claim_range(&self.consumer)
    }

    pub(crate) fn consumer_record_failed(&self) {
        self.record_failed(&self.consumer);
    }

    pub(crate) fn fmt_producer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.producer.fmt(f, "producer", self.mask)
    }

    pub(crate) fn fmt_consumer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.consumer.fmt(f, "consumer", self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_up_to_shrinks_at_physical_end() {
        let core = SpscCore::new(16, 0);
        let (from, to) = core.producer_acquire_exactly(10);
        assert_eq!((from, to), (0, 10));
        core.producer_release();
        core.consumer_acquire_exactly(10);
        core.consumer_release(); // consumer fully caught up: capacity isn't the limiter
        let (from, to) = core.producer_acquire_up_to(10);
        assert_eq!((from, to), (10, 16)); // shrunk by the physical end, not capacity
    }

    #[test]
    fn acquire_up_to_reports_zero_when_consumer_hasnt_caught_up() {
        let core = SpscCore::new(8, 0);
        let (from, to) = core.producer_acquire_up_to(8);
        assert_eq!((from, to), (0, 8));
        core.producer_release();
        // Ring is full: consumer has released nothing.
        let (from, to) = core.producer_acquire_up_to(1);
        assert_eq!((from, to), (0, 0));
        assert_eq!(core.failed_writes(), 1);
    }

    #[test]
    fn acquire_exactly_never_shrinks() {
        let core = SpscCore::new(8, 0);
        let (from, to) = core.producer_acquire_exactly(8);
        assert_eq!((from, to), (0, 8));
        core.producer_release();
        assert_eq!(core.producer_acquire_exactly(1), (0, 0));
    }

    #[test]
    fn acquire_exactly_rebases_across_the_physical_wrap() {
        let core = SpscCore::new(16, 0);
        // drain most of the ring so the next claim would cross the wrap
        let (from, to) = core.producer_acquire_exactly(12);
        assert_eq!((from, to), (0, 12));
        core.producer_release();
        core.consumer_acquire_exactly(12);
        core.consumer_release();
        // producer.released == 12, mask == 15, so released & mask == 12;
        // claiming 8 more would naively span [12, 20) -- rebased to [0, 4).
        let (from, to) = core.producer_acquire_exactly(8);
        assert_eq!((from, to), (0, 4));
    }

    #[test]
    fn release_lazy_still_advances_released() {
        let core = SpscCore::new(8, 0);
        core.producer_acquire_exactly(3);
        core.producer_release_lazy();
        assert_eq!(core.producer_released(), 3);
    }

    #[test]
    fn producer_and_consumer_round_trip() {
        let core = SpscCore::new(8, 0);
        let (from, to) = core.producer_acquire_exactly(5);
        assert_eq!((from, to), (0, 5));
        core.producer_release();
        let (from, to) = core.consumer_acquire_up_to(5);
        assert_eq!((from, to), (0, 5));
        core.consumer_release();
        assert_eq!(core.consumer_released(), 5);
    }
}
