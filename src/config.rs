//! Queue configuration: ring size and the tick-pause duration used whenever
//! a claim fails. Validated eagerly, the same way the teacher's `Config`
//! validates `ring_bits`/`max_producers` up front rather than at first use.

use crate::error::ConfigError;

/// Upper bound on ring `size`, chosen so `released - offset` (and the MPSC
/// equality check `w - size == released`) never risk overflowing `i64`.
pub const MAX_SIZE: i64 = 1 << 41;

/// Validated configuration shared by every queue constructor in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Ring capacity in bytes (`ByteQ`/`ByteMsgQ`) or slots (`PointerQ`), or
    /// bytes for `ByteChunkQ` (must additionally be a multiple of `chunk`).
    /// Must be a power of two, in `[1, MAX_SIZE]`.
    pub size: i64,
    /// Ticks to busy-wait after a failed claim.
    pub pause_ticks: i64,
}

impl QueueConfig {
    /// Builds a configuration, panicking if `size` is invalid.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not a power of two in `[1, MAX_SIZE]`. Prefer
    /// [`validate_size`] when `size` comes from outside the program (it
    /// returns a [`ConfigError`] instead of panicking).
    #[must_use]
    pub const fn new(size: i64, pause_ticks: i64) -> Self {
        assert!(size >= 1, "size must be at least 1");
        assert!(size & (size - 1) == 0, "size must be a power of two");
        assert!(size <= MAX_SIZE, "size exceeds 2^41");
        Self { size, pause_ticks }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new(1 << 16, 1024)
    }
}

/// 4096-byte/slot ring, short pause — minimizes latency at the cost of
/// capacity.
pub const LOW_LATENCY: QueueConfig = QueueConfig::new(1 << 12, 256);

/// 16 MiB ring, longer pause — favors sustained throughput over a small
/// working set.
pub const HIGH_THROUGHPUT: QueueConfig = QueueConfig::new(1 << 24, 4096);

/// Validates a runtime-supplied `size`, returning a [`ConfigError`] instead
/// of panicking. Every `*_queue` constructor in this crate calls this before
/// allocating anything.
pub(crate) fn validate_size(size: i64) -> Result<(), ConfigError> {
    if size < 1 {
        return Err(ConfigError::SizeTooSmall { size });
    }
    if size & (size - 1) != 0 {
        return Err(ConfigError::NotPowerOfTwo { size });
    }
    if size > MAX_SIZE {
        return Err(ConfigError::SizeTooLarge { size, max: MAX_SIZE });
    }
    Ok(())
}

/// Validates a `ByteChunkQ` chunk size against an already-validated ring
/// `size`.
pub(crate) fn validate_chunk(size: i64, chunk: i64) -> Result<(), ConfigError> {
    if chunk < 1 {
        return Err(ConfigError::ChunkTooSmall { chunk });
    }
    if size % chunk != 0 {
        return Err(ConfigError::ChunkNotDivisor { size, chunk });
    }
    Ok(())
}
