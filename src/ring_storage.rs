//! Padded ring storage: the byte buffer behind [`crate::byte_queue`] /
//! [`crate::chunk_queue`] / [`crate::msg_queue`], and the `u64` slot buffer
//! behind [`crate::pointer_queue`] / [`crate::mpsc_pointer_queue`].
//!
//! Both allocate [`CACHE_LINE`](crate::cacheline::CACHE_LINE) bytes of
//! padding before and after the addressable region, reserving guard space
//! around the visible slice rather than relying on the allocator to isolate
//! it.

use crate::cacheline::CACHE_LINE;
use std::cell::UnsafeCell;
use std::sync::atomic::AtomicU64;

/// A padded byte buffer, producer and consumer disjointly reading/writing
/// physical ranges handed out by the `AcquireReleaser` handshake.
///
/// # Safety
///
/// `slice`/`slice_mut` are unsafe: the caller must already hold a claim
/// (from `acquire_up_to`/`acquire_exactly`) over the range it indexes, and
/// must not let two live slices cover overlapping bytes — the handshake in
/// [`crate::core`] is what guarantees that, not this type.
pub(crate) struct PaddedBytes {
    storage: UnsafeCell<Box<[u8]>>,
    offset: usize,
    len: usize,
}

// SAFETY: all interior mutability is guarded by the acquire/release protocol
// in `crate::core`, which enforces that producer and consumer never claim
// overlapping ranges concurrently.
unsafe impl Sync for PaddedBytes {}

impl PaddedBytes {
    pub(crate) fn new(len: usize) -> Self {
        let total = CACHE_LINE + len + CACHE_LINE;
        Self {
            storage: UnsafeCell::new(vec![0u8; total].into_boxed_slice()),
            offset: CACHE_LINE,
            len,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// # Safety
    /// See the type-level safety note.
    pub(crate) unsafe fn slice(&self, from: usize, to: usize) -> &mut [u8] {
        debug_assert!(to <= self.len, "claimed range escapes the padded ring");
        let base = (*self.storage.get()).as_mut_ptr().add(self.offset);
        std::slice::from_raw_parts_mut(base.add(from), to - from)
    }
}

/// A padded slot buffer of `u64` words, `0` reserved as the empty sentinel.
/// Used by both the SPSC and MPSC pointer queues; the SPSC side accesses
/// slots through the same happens-before edge `PaddedBytes` relies on, the
/// MPSC side genuinely CASes across producer threads.
pub(crate) struct PaddedSlots {
    storage: Box<[AtomicU64]>,
    offset: usize,
    len: usize,
}

impl PaddedSlots {
    pub(crate) fn new(len: usize) -> Self {
        let total = CACHE_LINE / 8 + len + CACHE_LINE / 8;
        let storage = (0..total).map(|_| AtomicU64::new(0)).collect::<Vec<_>>().into_boxed_slice();
        Self { storage, offset: CACHE_LINE / 8, len }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn slot(&self, idx: usize) -> &AtomicU64 {
        debug_assert!(idx < self.len, "slot index escapes the padded ring");
        &self.storage[self.offset + idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn padded_bytes_exposes_exactly_len_addressable_bytes() {
        let buf = PaddedBytes::new(16);
        assert_eq!(buf.len(), 16);
        let s = unsafe { buf.slice(0, 16) };
        assert_eq!(s.len(), 16);
        s[0] = 7;
        s[15] = 9;
    }

    #[test]
    fn padded_slots_round_trip() {
        let slots = PaddedSlots::new(4);
        slots.slot(2).store(42, Ordering::Relaxed);
        assert_eq!(slots.slot(2).load(Ordering::Relaxed), 42);
        assert_eq!(slots.slot(0).load(Ordering::Relaxed), 0);
    }
}
