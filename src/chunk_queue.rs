//! `ByteChunkQ`: an SPSC queue of fixed-size byte frames.
//!
//! Every claim is exactly `chunk` bytes or nothing — there is no short-claim
//! path like [`crate::byte_queue::ByteQ`]'s `acquire_write`. Because `chunk`
//! evenly divides `size` (validated at construction), a chunk claim can
//! never straddle the physical wrap: every chunk starts at a multiple of
//! `chunk`, and `acquire_exactly` already rebases any claim that would cross
//! the ring end.

use crate::config::QueueConfig;
use crate::core::SpscCore;
use crate::error::ConfigError;
use crate::invariants::debug_assert_chunk_claim;
use crate::ring_storage::PaddedBytes;
use std::fmt;
use std::sync::Arc;

struct Inner {
    core: SpscCore,
    storage: PaddedBytes,
    chunk: usize,
}

/// The producer (write) side of a [`ByteChunkQ`](chunk_queue).
pub struct ChunkWriter {
    inner: Arc<Inner>,
}

/// The consumer (read) side of a [`ByteChunkQ`](chunk_queue).
pub struct ChunkReader {
    inner: Arc<Inner>,
}

/// Builds a fixed-chunk SPSC queue. `chunk` must be a positive divisor of
/// `config.size`.
pub fn chunk_queue(config: QueueConfig, chunk: usize) -> Result<(ChunkWriter, ChunkReader), ConfigError> {
    crate::config::validate_size(config.size)?;
    crate::config::validate_chunk(config.size, chunk as i64)?;
    let inner = Arc::new(Inner {
        core: SpscCore::new(config.size, config.pause_ticks),
        storage: PaddedBytes::new(config.size as usize),
        chunk,
    });
    Ok((ChunkWriter { inner: inner.clone() }, ChunkReader { inner }))
}

impl ChunkWriter {
    /// Claims the next chunk to write into, or `None` if the ring is full.
    pub fn acquire_write(&self) -> Option<&mut [u8]> {
        let (from, to) = self.inner.core.producer_acquire_exactly(self.inner.chunk as i64);
        if from == to {
            return None;
        }
        debug_assert_chunk_claim!(from, to, self.inner.chunk as i64);
        // SAFETY: the handshake just granted this exact range to the
        // producer; no other call can observe it until `release_write`.
        Some(unsafe { self.inner.storage.slice(from as usize, to as usize) })
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

impl ChunkReader {
    /// Claims the next chunk to read, or `None` if nothing has been
    /// published yet.
    pub fn acquire_read(&self) -> Option<&[u8]> {
        let (from, to) = self.inner.core.consumer_acquire_exactly(self.inner.chunk as i64);
        if from == to {
            return None;
        }
        debug_assert_chunk_claim!(from, to, self.inner.chunk as i64);
        // SAFETY: the handshake just granted this exact range to the
        // consumer; no other call can observe it until `release_read`.
        Some(unsafe { self.inner.storage.slice(from as usize, to as usize) })
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

impl fmt::Debug for ChunkWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkWriter ")?;
        self.inner.core.fmt_producer(f)
    }
}

impl fmt::Debug for ChunkReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkReader ")?;
        self.inner.core.fmt_consumer(f)
    }
}
