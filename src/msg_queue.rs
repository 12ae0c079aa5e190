//! `ByteMsgQ`: an SPSC queue of variable-length, length-prefixed messages.
//!
//! Every message is stored as an 8-byte header (an `i64`, native-endian,
//! read/written via unaligned load/store — never pointer-cast aliasing)
//! followed by the payload. A non-negative header is a real payload length;
//! a negative header is a wrap-skip marker whose magnitude is the number of
//! dead bytes to ignore before the real message, which always restarts at
//! physical offset 0. See [`crate`]'s module docs and `SPEC_FULL.md` §4.6
//! for the full framing rationale.

use crate::config::QueueConfig;
use crate::core::SpscCore;
use crate::error::ConfigError;
use crate::ring_storage::PaddedBytes;
use std::fmt;
use std::sync::Arc;

const HEADER_SIZE: i64 = 8;

struct Inner {
    core: SpscCore,
    storage: PaddedBytes,
}

/// The producer (write) side of a [`ByteMsgQ`](msg_queue).
pub struct MsgWriter {
    inner: Arc<Inner>,
}

/// The consumer (read) side of a [`ByteMsgQ`](msg_queue).
pub struct MsgReader {
    inner: Arc<Inner>,
}

/// Builds a variable-length message SPSC queue. `config.size` must be at
/// least `HEADER_SIZE` bytes so a header always fits at physical offset 0.
pub fn msg_queue(config: QueueConfig) -> Result<(MsgWriter, MsgReader), ConfigError> {
    crate::config::validate_size(config.size)?;
    let inner = Arc::new(Inner {
        core: SpscCore::new(config.size, config.pause_ticks),
        storage: PaddedBytes::new(config.size as usize),
    });
    Ok((MsgWriter { inner: inner.clone() }, MsgReader { inner }))
}

/// # Safety
/// `from` must be a valid offset into `storage` with at least 8 bytes
/// available starting there.
unsafe fn write_header(storage: &PaddedBytes, from: usize, value: i64) {
    let dst = storage.slice(from, from + HEADER_SIZE as usize).as_mut_ptr();
    std::ptr::write_unaligned(dst.cast::<i64>(), value);
}

/// # Safety
/// `from` must be a valid offset into `storage` with at least 8 bytes
/// available starting there, previously written by [`write_header`].
unsafe fn read_header(storage: &PaddedBytes, from: usize) -> i64 {
    let src = storage.slice(from, from + HEADER_SIZE as usize).as_ptr();
    std::ptr::read_unaligned(src.cast::<i64>())
}

impl MsgWriter {
    /// Claims space for a message of `payload_len` bytes and returns a
    /// mutable slice into its payload region (the header has already been
    /// written). Returns `None` if there's no room right now.
    pub fn acquire_write(&self, payload_len: usize) -> Option<&mut [u8]> {
        let size = self.inner.core.size();
        let mask = self.inner.core.mask();
        let msg_size = payload_len as i64 + HEADER_SIZE;
        let producer_released = self.inner.core.producer_released();
        let tail = producer_released & mask;
        let rem = size - tail;

        let total = if rem >= msg_size { msg_size } else { rem + msg_size };
        let (from, to) = self.inner.core.producer_acquire_exactly(total);
        if from == to {
            return None;
        }
        // SAFETY: `acquire_exactly` just granted exclusive access to
        // `[from, to)`; it has already rebased to physical offset 0 when the
        // naive range would have crossed the wrap.
        unsafe {
            if rem >= msg_size {
                write_header(&self.inner.storage, from as usize, msg_size);
                Some(self.inner.storage.slice((from + HEADER_SIZE) as usize, to as usize))
            } else {
                if rem >= HEADER_SIZE {
                    // The skip marker lives at the old tail; `from` (0 here)
                    // has already been rebased past it by `acquire_exactly`.
                    write_header(&self.inner.storage, tail as usize, -rem);
                }
                write_header(&self.inner.storage, 0, msg_size);
                Some(self.inner.storage.slice(HEADER_SIZE as usize, to as usize))
            }
        }
    }

    pub fn release_write(&self) {
        self.inner.core.producer_release();
    }

    pub fn release_write_lazy(&self) {
        self.inner.core.producer_release_lazy();
    }

    pub fn failed_writes(&self) -> u64 {
        self.inner.core.failed_writes()
    }
}

impl MsgReader {
    /// Claims the next published message and returns a slice over its
    /// payload, or `None` if nothing new has been published.
    pub fn acquire_read(&self) -> Option<&[u8]> {
        let size = self.inner.core.size();
        let mask = self.inner.core.mask();
        let consumer_released = self.inner.core.consumer_released();
        let mut from = (consumer_released & mask) as usize;
        let rem = size - from as i64;
        let mut waste_offset = 0i64;
        if rem < HEADER_SIZE {
            waste_offset = rem;
            from = 0;
        }
        // SAFETY: `from` is either the current consumer tail (already
        // published, by definition of `consumer_released`) or physical
        // offset 0 after a waste-offset pre-advance; both have at least
        // HEADER_SIZE bytes behind a prior producer claim.
        let mut msg_size = unsafe { read_header(&self.inner.storage, from) };
        if msg_size < 0 {
            waste_offset = rem;
            from = 0;
            msg_size = unsafe { read_header(&self.inner.storage, 0) };
        }
        if msg_size == 0 {
            // No header has ever been published at this offset -- the queue
            // is empty from the consumer's point of view. A real message's
            // header is always >= HEADER_SIZE, so 0 is unambiguous. Treat
            // this the same as any other failed claim: bump `failed`, pause,
            // and don't call `acquire_exactly(0)`, which would otherwise
            // trivially succeed and hand back a no-op `(0, 0)` claim.
            self.inner.core.consumer_record_failed();
            return None;
        }
        let (claim_from, claim_to) = self.inner.core.consumer_acquire_exactly(msg_size + waste_offset);
        if claim_from == claim_to {
            return None;
        }
        // SAFETY: `consumer_acquire_exactly` granted exclusive read access
        // over `[claim_from, claim_to)`, which starts at the same physical
        // offset `from` that `msg_size`'s header was read from (rebased to 0
        // when `waste_offset` was non-zero).
        Some(unsafe { self.inner.storage.slice((claim_from + HEADER_SIZE) as usize, claim_to as usize) })
    }

    pub fn release_read(&self) {
        self.inner.core.consumer_release();
    }

    pub fn release_read_lazy(&self) {
        self.inner.core.consumer_release_lazy();
    }

    pub fn failed_reads(&self) -> u64 {
        self.inner.core.failed_reads()
    }
}

impl fmt::Debug for MsgWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MsgWriter ")?;
        self.inner.core.fmt_producer(f)
    }
}

impl fmt::Debug for MsgReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MsgReader ")?;
        self.inner.core.fmt_consumer(f)
    }
}
