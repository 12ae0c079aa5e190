//! `ByteQ`: a raw byte stream over the `AcquireReleaser` handshake.
//!
//! Claims may come back shorter than requested — either the physical ring
//! end or the consumer's watermark limits them. `write`/`read` are a
//! convenience pair that hide that by splitting the copy across the
//! physical wrap point themselves.

use crate::config::QueueConfig;
use crate::core::SpscCore;
use crate::error::ConfigError;
use crate::ring_storage::PaddedBytes;
use std::fmt;
use std::sync::Arc;

struct Inner {
    core: SpscCore,
    storage: PaddedBytes,
}

/// The producer (write) side of a [`ByteQ`](byte_queue).
pub struct ByteWriter {
    inner: Arc<Inner>,
}

/// The consumer (read) side of a [`ByteQ`](byte_queue).
pub struct ByteReader {
    inner: Arc<Inner>,
}

/// Builds a raw-byte SPSC queue, returning its writer and reader halves.
pub fn byte_queue(config: QueueConfig) -> Result<(ByteWriter, ByteReader), ConfigError> {
    crate::config::validate_size(config.size)?;
    let inner = Arc::new(Inner {
        core: SpscCore::new(config.size, config.pause_ticks),
        storage: PaddedBytes::new(config.size as usize),
    });
    Ok((ByteWriter { inner: inner.clone() }, ByteReader { inner }))
}

impl ByteWriter {
    /// Claims up to `request` bytes to write into. May return fewer than
    /// requested (including an empty slice if nothing is available right
    /// now); never panics on a short claim.
    pub fn acquire_write(&self, request: usize) -> &mut [u8] {
        let (from, to) = self.inner.core.producer_acquire_up_to(request as i64);
        // SAFETY: the handshake just granted this exact range to the
        // producer; no other call can observe it until `release_write`.
        unsafe { self.inner.storage.slice(from as usize, to as usize) }
    }

    /// Publishes the most recent `acquire_write` claim.
    pub fn release_write(&self) {
        self.inner.core.producer_release();
    }

    /// Like `release_write`, but with a relaxed store instead of a
    /// release-ordered one. Only sound when producer and consumer are
    /// pinned to the same core/socket.
    pub fn release_write_lazy(&self) {
        self.inner.core.producer_release_lazy();
    }

    /// Copies `buf` in as one logical write, splitting across the physical
    /// wrap if needed. Returns `false` (nothing copied) if the full length
    /// isn't available right now.
    pub fn write(&self, buf: &[u8]) -> bool {
        let Some((from, first, wrap)) = self.inner.core.producer_claim_wrapping(buf.len() as i64) else {
            return false;
        };
        // SAFETY: `claim_wrapping` just granted this exact two-segment
        // range to the producer.
        unsafe {
            self.inner.storage.slice(from as usize, (from + first) as usize).copy_from_slice(&buf[..first as usize]);
            if wrap > 0 {
                self.inner.storage.slice(0, wrap as usize).copy_from_slice(&buf[first as usize..]);
            }
        }
        self.inner.core.producer_release();
        true
    }

    pub fn failed_writes(&self) -> u64 {
        self.inner.core.failed_writes()
    }
}

impl ByteReader {
    /// Claims up to `request` bytes to read from. May return fewer than
    /// requested, including an empty slice.
    pub fn acquire_read(&self, request: usize) -> &[u8] {
        let (from, to) = self.inner.core.consumer_acquire_up_to(request as i64);
        // SAFETY: the handshake just granted this exact range to the
        // consumer; no other call can observe it until `release_read`.
        unsafe { self.inner.storage.slice(from as usize, to as usize) }
    }

    pub fn release_read(&self) {
        self.inner.core.consumer_release();
    }

    pub fn release_read_lazy(&self) {
        self.inner.core.consumer_release_lazy();
    }

    /// Copies exactly `out.len()` bytes out, splitting across the physical
    /// wrap if needed. Returns `false` (nothing copied) if that many bytes
    /// aren't available right now.
    pub fn read(&self, out: &mut [u8]) -> bool {
        let Some((from, first, wrap)) = self.inner.core.consumer_claim_wrapping(out.len() as i64) else {
            return false;
        };
        // SAFETY: `claim_wrapping` just granted this exact two-segment
        // range to the consumer.
        unsafe {
            out[..first as usize].copy_from_slice(self.inner.storage.slice(from as usize, (from + first) as usize));
            if wrap > 0 {
                out[first as usize..].copy_from_slice(self.inner.storage.slice(0, wrap as usize));
            }
        }
        self.inner.core.consumer_release();
        true
    }

    pub fn failed_reads(&self) -> u64 {
        self.inner.core.failed_reads()
    }
}

impl fmt::Debug for ByteWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByteWriter ")?;
        self.inner.core.fmt_producer(f)
    }
}

impl fmt::Debug for ByteReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByteReader ")?;
        self.inner.core.fmt_consumer(f)
    }
}
