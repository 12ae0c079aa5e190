//! MPSC `PointerQ`: multiple producers, one consumer, no single owner of the
//! producer sequence.
//!
//! This is the one queue shape in this crate that doesn't sit on top of
//! [`crate::core::SpscCore`] — with more than one producer thread, the
//! producer side can no longer own a single-writer `released` counter the
//! way [`crate::core::Cursor`] assumes. Instead, capacity is gated on a
//! shared atomic producer sequence and a per-producer-handle cached
//! snapshot of the consumer's watermark, while the actual claim is a
//! per-slot compare-exchange against the null sentinel (see `SPEC_FULL.md`
//! §4.8).

use crate::cacheline::CACHE_LINE;
use crate::config::QueueConfig;
use crate::error::ConfigError;
use crate::invariants::debug_assert_slot_zeroed;
use crossbeam_utils::CachePadded;
use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

struct Inner {
    size: i64,
    mask: i64,
    pause_ticks: i64,
    producer_seq: CachePadded<AtomicI64>,
    consumer_seq: CachePadded<AtomicI64>,
    failed_writes: AtomicU64,
    failed_reads: AtomicU64,
    slots: Box<[AtomicU64]>,
    slot_offset: usize,
}

impl Inner {
    fn slot(&self, idx: usize) -> &AtomicU64 {
        &self.slots[self.slot_offset + idx]
    }
}

/// A producer handle. `Clone` to share across producer threads — each clone
/// carries its own private cache of the consumer's watermark, mirroring the
/// per-endpoint private cache in the SPSC protocol.
pub struct MpscPointerSender {
    inner: Arc<Inner>,
    cached_consumer: Cell<i64>,
}

// SAFETY: `cached_consumer` is a private, per-handle retry optimization; a
// clone sent to another thread gets its own `Cell`, so no two threads ever
// touch the same one. The sequence and slots it reads/writes are atomics.
unsafe impl Send for MpscPointerSender {}

impl Clone for MpscPointerSender {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), cached_consumer: Cell::new(self.cached_consumer.get()) }
    }
}

/// The single consumer handle. Not `Clone` — only one consumer thread may
/// exist per queue.
pub struct MpscPointerReceiver {
    inner: Arc<Inner>,
}

/// Builds an MPSC pointer queue, returning a producer handle (clone it per
/// producer thread) and the sole consumer handle.
pub fn mpsc_pointer_queue(config: QueueConfig) -> Result<(MpscPointerSender, MpscPointerReceiver), ConfigError> {
    crate::config::validate_size(config.size)?;
    let size = config.size as usize;
    let slot_offset = CACHE_LINE / 8;
    let total = slot_offset + size + CACHE_LINE / 8;
    let slots = (0..total).map(|_| AtomicU64::new(0)).collect::<Vec<_>>().into_boxed_slice();
    let inner = Arc::new(Inner {
        size: config.size,
        mask: config.size - 1,
        pause_ticks: config.pause_ticks,
        producer_seq: CachePadded::new(AtomicI64::new(0)),
        consumer_seq: CachePadded::new(AtomicI64::new(0)),
        failed_writes: AtomicU64::new(0),
        failed_reads: AtomicU64::new(0),
        slots,
        slot_offset,
    });
    Ok((
        MpscPointerSender { inner: inner.clone(), cached_consumer: Cell::new(0) },
        MpscPointerReceiver { inner },
    ))
}

impl MpscPointerSender {
    /// Attempts to enqueue `val`. Returns `false` if the ring appears full
    /// (stale or fresh) or another producer currently holds the target slot.
    pub fn write_single(&self, val: NonZeroU64) -> bool {
        let w = self.inner.producer_seq.load(Ordering::Relaxed);
        let mut cached = self.cached_consumer.get();
        if w - self.inner.size == cached {
            cached = self.inner.consumer_seq.load(Ordering::Acquire);
            self.cached_consumer.set(cached);
            if w - self.inner.size == cached {
                self.inner.failed_writes.fetch_add(1, Ordering::Relaxed);
                crate::tick::pause(self.inner.pause_ticks);
                return false;
            }
        }
        let idx = (w & self.inner.mask) as usize;
        let slot = self.inner.slot(idx);
        match slot.compare_exchange(0, val.get(), Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => {
                self.inner.producer_seq.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                crate::tick::pause(self.inner.pause_ticks);
                false
            }
        }
    }

    /// Spins until `val` can be enqueued.
    pub fn write_single_blocking(&self, val: NonZeroU64) {
        while !self.write_single(val) {
            thread::yield_now();
        }
    }

    pub fn failed_writes(&self) -> u64 {
        self.inner.failed_writes.load(Ordering::Relaxed)
    }
}

impl MpscPointerReceiver {
    /// Attempts to dequeue the next value. Returns `None` if the slot the
    /// consumer is waiting on is still empty.
    pub fn read_single(&self) -> Option<NonZeroU64> {
        let local_read = self.inner.consumer_seq.load(Ordering::Relaxed);
        let idx = (local_read & self.inner.mask) as usize;
        let slot = self.inner.slot(idx);
        let val = slot.load(Ordering::Acquire);
        if val == 0 {
            self.inner.failed_reads.fetch_add(1, Ordering::Relaxed);
            crate::tick::pause(self.inner.pause_ticks);
            return None;
        }
        slot.store(0, Ordering::Release);
        debug_assert_slot_zeroed!(slot.load(Ordering::Relaxed));
        self.inner.consumer_seq.store(local_read + 1, Ordering::Release);
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
        self.inner.failed_reads.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MpscPointerSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MpscPointerSender {{ producer_seq {}, cached_consumer {}, failed {} }}",
            self.inner.producer_seq.load(Ordering::Relaxed),
            self.cached_consumer.get(),
            self.failed_writes(),
        )
    }
}

impl fmt::Debug for MpscPointerReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MpscPointerReceiver {{ consumer_seq {}, failed {} }}",
            self.inner.consumer_seq.load(Ordering::Relaxed),
            self.failed_reads(),
        )
    }
}
