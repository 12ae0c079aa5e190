//! SPSC `PointerQ`: a slot queue of machine-word-sized values.
//!
//! Same protocol as [`crate::byte_queue::ByteQ`], but the ring is typed as
//! `u64` slots instead of raw bytes. `0` is reserved as the empty sentinel,
//! so the public value type is [`NonZeroU64`] — a caller cannot accidentally
//! enqueue the sentinel. On release, every slot the consumer just drained is
//! zeroed before `released` advances, so the ring never holds a value live
//! past the consumer's watermark (see `SPEC_FULL.md` §4.7).

use crate::config::QueueConfig;
use crate::core::SpscCore;
use crate::error::ConfigError;
use crate::invariants::debug_assert_slot_zeroed;
use crate::ring_storage::PaddedSlots;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

struct Inner {
    core: SpscCore,
    storage: PaddedSlots,
}

/// The producer (write) side of a [`PointerQ`](pointer_queue).
pub struct PointerWriter {
    inner: Arc<Inner>,
}

/// The consumer (read) side of a [`PointerQ`](pointer_queue).
pub struct PointerReader {
    inner: Arc<Inner>,
}

/// Builds a SPSC pointer queue, returning its writer and reader halves.
pub fn pointer_queue(config: QueueConfig) -> Result<(PointerWriter, PointerReader), ConfigError> {
    crate::config::validate_size(config.size)?;
    let inner = Arc::new(Inner {
        core: SpscCore::new(config.size, config.pause_ticks),
        storage: PaddedSlots::new(config.size as usize),
    });
    Ok((PointerWriter { inner: inner.clone() }, PointerReader { inner }))
}

impl PointerWriter {
    /// Claims up to `n` slots to write into. May return fewer than
    /// requested, including none at all.
    pub fn acquire_write(&self, n: usize) -> ClaimedSlots<'_> {
        let (from, to) = self.inner.core.producer_acquire_up_to(n as i64);
        ClaimedSlots { inner: &self.inner, from: from as usize, to: to as usize }
    }

    pub fn release_write(&self) {
        self.inner.core.producer_release();
    }

    pub fn release_write_lazy(&self) {
        self.inner.core.producer_release_lazy();
    }

    /// Writes a single value. Returns `false` (nothing written) if the ring
    /// is full right now.
    pub fn write_single(&self, val: NonZeroU64) -> bool {
        let (from, to) = self.inner.core.producer_acquire_exactly(1);
        if from == to {
            return false;
        }
        self.inner.storage.slot(from as usize).store(val.get(), Ordering::Relaxed);
        self.inner.core.producer_release();
        true
    }

    /// Like `write_single`, but publishes with a relaxed store.
    pub fn write_single_lazy(&self, val: NonZeroU64) -> bool {
        let (from, to) = self.inner.core.producer_acquire_exactly(1);
        if from == to {
            return false;
        }
        self.inner.storage.slot(from as usize).store(val.get(), Ordering::Relaxed);
        self.inner.core.producer_release_lazy();
        true
    }

    /// Spins until `val` can be written.
    pub fn write_single_blocking(&self, val: NonZeroU64) {
        while !self.write_single(val) {
            thread::yield_now();
        }
    }

    pub fn failed_writes(&self) -> u64 {
        self.inner.core.failed_writes()
    }
}

impl PointerReader {
    /// Claims up to `n` slots to read from. May return fewer than
    /// requested, including none at all.
    pub fn acquire_read(&self, n: usize) -> ClaimedSlots<'_> {
        let (from, to) = self.inner.core.consumer_acquire_up_to(n as i64);
        ClaimedSlots { inner: &self.inner, from: from as usize, to: to as usize }
    }

    /// Releases the most recent `acquire_read` claim, zeroing every slot it
    /// covered first.
    pub fn release_read(&self) {
        let (from, to) = self.inner.core.consumer_claim_range();
        for idx in from as usize..to as usize {
            let slot = self.inner.storage.slot(idx);
            slot.store(0, Ordering::Relaxed);
            debug_assert_slot_zeroed!(slot.load(Ordering::Relaxed));
        }
        self.inner.core.consumer_release();
    }

    pub fn release_read_lazy(&self) {
        let (from, to) = self.inner.core.consumer_claim_range();
        for idx in from as usize..to as usize {
            let slot = self.inner.storage.slot(idx);
            slot.store(0, Ordering::Relaxed);
            debug_assert_slot_zeroed!(slot.load(Ordering::Relaxed));
        }
        self.inner.core.consumer_release_lazy();
    }

    /// Reads a single value, or `None` if nothing's been published yet.
    pub fn read_single(&self) -> Option<NonZeroU64> {
        let (from, to) = self.inner.core.consumer_acquire_exactly(1);
        if from == to {
            return None;
        }
        let slot = self.inner.storage.slot(from as usize);
        let val = slot.load(Ordering::Relaxed);
        slot.store(0, Ordering::Relaxed);
        debug_assert_slot_zeroed!(slot.load(Ordering::Relaxed));
        self.inner.core.consumer_release();
        NonZeroU64::new(val)
    }

    pub fn read_single_lazy(&self) -> Option<NonZeroU64> {
        let (from, to) = self.inner.core.consumer_acquire_exactly(1);
        if from == to {
            return None;
        }
        let slot = self.inner.storage.slot(from as usize);
        let val = slot.load(Ordering::Relaxed);
        slot.store(0, Ordering::Relaxed);
        self.inner.core.consumer_release_lazy();
        NonZeroU64::new(val)
    }

    /// Spins until a value is available.
    pub fn read_single_blocking(&self) -> NonZeroU64 {
        loop {
            if let Some(val) = self.read_single() {
                return val;
            }
            thread::yield_now();
        }
    }

    pub fn failed_reads(&self) -> u64 {
        self.inner.core.failed_reads()
    }
}

/// A claimed, contiguous range of slots granted by `acquire_write`/
/// `acquire_read`. Borrows the queue for its lifetime; `release_write`/
/// `release_read` commit whatever was written through it.
pub struct ClaimedSlots<'a> {
    inner: &'a Inner,
    from: usize,
    to: usize,
}

impl ClaimedSlots<'_> {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Stores `val` at position `idx` within the claim (`0 <= idx < len()`).
    pub fn set(&self, idx: usize, val: NonZeroU64) {
        self.inner.storage.slot(self.from + idx).store(val.get(), Ordering::Relaxed);
    }

    /// Loads the value at position `idx` within the claim, zeroing as it
    /// goes (the read-side slot-hygiene rule). Returns `None` if the slot
    /// was never written (shouldn't happen for a properly-published claim,
    /// but the sentinel makes the distinction observable).
    pub fn take(&self, idx: usize) -> Option<NonZeroU64> {
        let slot = self.inner.storage.slot(self.from + idx);
        let val = slot.load(Ordering::Relaxed);
        slot.store(0, Ordering::Relaxed);
        NonZeroU64::new(val)
    }
}

impl fmt::Debug for PointerWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PointerWriter ")?;
        self.inner.core.fmt_producer(f)
    }
}

impl fmt::Debug for PointerReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PointerReader ")?;
        self.inner.core.fmt_consumer(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(v: u64) -> NonZeroU64 {
        NonZeroU64::new(v).unwrap()
    }

    #[test]
    fn single_item_round_trip_sums_to_the_expected_total() {
        let (w, r) = pointer_queue(QueueConfig::new(8, 0)).unwrap();
        let mut sum = 0u64;
        for i in 1..=1000u64 {
            w.write_single_blocking(nz(i));
            sum += r.read_single_blocking().get();
        }
        assert_eq!(sum, 1000 * 1001 / 2);
    }

    #[test]
    fn released_slots_read_back_as_null_after_release_read() {
        let (w, r) = pointer_queue(QueueConfig::new(8, 0)).unwrap();
        assert!(w.write_single(nz(42)));
        assert_eq!(r.read_single(), Some(nz(42)));
        // the slot backing this value must now be zero
        assert_eq!(r.inner.storage.slot(0).load(Ordering::Relaxed), 0);
    }

    #[test]
    fn batch_release_read_zeroes_every_slot_it_covered() {
        let (w, r) = pointer_queue(QueueConfig::new(8, 0)).unwrap();
        let claim = w.acquire_write(4);
        for i in 0..4 {
            claim.set(i, nz(i as u64 + 1));
        }
        w.release_write();
        let claim = r.acquire_read(4);
        assert_eq!(claim.len(), 4);
        r.release_read();
        for i in 0..4 {
            assert_eq!(r.inner.storage.slot(i).load(Ordering::Relaxed), 0);
        }
    }

    #[test]
    fn batch_claim_shrinks_when_ring_is_full() {
        let (w, _r) = pointer_queue(QueueConfig::new(4, 0)).unwrap();
        let claim = w.acquire_write(4);
        assert_eq!(claim.len(), 4);
        for i in 0..4 {
            claim.set(i, nz(i as u64 + 1));
        }
        w.release_write();
        let claim = w.acquire_write(4);
        assert_eq!(claim.len(), 0);
        assert_eq!(w.failed_writes(), 1);
    }
}
