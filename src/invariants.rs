//! Debug assertion macros for this crate's own protocol invariants.
//!
//! Mirrors the teacher crate's `invariants.rs`: a small library of
//! `debug_assert!`-based macros, each tagged with a short mnemonic and
//! compiled out entirely in release builds. These check the data-model
//! invariants from `SPEC_FULL.md` §3, not anything observable by callers.

// =============================================================================
// INV-CAP-01: Capacity Bound
// =============================================================================

/// Assert the capacity bound: `0 <= producer.released - consumer.released <= size`.
///
/// Used in: `SpscCore::release`/`SpscCore::release_lazy` after advancing
/// either side's `released`.
macro_rules! debug_assert_capacity_bound {
    ($producer_released:expr, $consumer_released:expr, $size:expr) => {
        debug_assert!(
            $producer_released >= $consumer_released && $producer_released - $consumer_released <= $size,
            "INV-CAP-01 violated: producer {} consumer {} size {}",
            $producer_released,
            $consumer_released,
            $size
        )
    };
}

// =============================================================================
// INV-SEQ-01: Released Never Decreases
// =============================================================================

/// Assert that a `released` counter only ever increases.
///
/// Used in: `SpscCore::release`/`release_lazy`.
macro_rules! debug_assert_released_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!($new >= $old, "INV-SEQ-01 violated: {} released went from {} to {}", $name, $old, $new)
    };
}

// =============================================================================
// INV-RING-01: Claim Stays Inside the Physical Ring
// =============================================================================

/// Assert a claimed `[from, to)` range never escapes `[0, size]`.
///
/// Used in: every `acquire_*` in `SpscCore`.
macro_rules! debug_assert_claim_within_ring {
    ($from:expr, $to:expr, $size:expr) => {
        debug_assert!(
            $from >= 0 && $to <= $size && $from <= $to,
            "INV-RING-01 violated: claim [{}, {}) escapes ring of size {}",
            $from,
            $to,
            $size
        )
    };
}

// =============================================================================
// INV-CHUNK-01: Chunk Claims Are Exactly `chunk` Bytes, Chunk-Aligned
// =============================================================================

/// Assert a `ByteChunkQ` claim is exactly `chunk` bytes and chunk-aligned.
///
/// Used in: `ChunkWriter::acquire_write`, `ChunkReader::acquire_read`.
macro_rules! debug_assert_chunk_claim {
    ($from:expr, $to:expr, $chunk:expr) => {
        debug_assert_eq!($to - $from, $chunk, "INV-CHUNK-01 violated: claim length is not `chunk`");
        debug_assert_eq!($from % $chunk, 0, "INV-CHUNK-01 violated: claim does not start chunk-aligned");
    };
}

// =============================================================================
// INV-SLOT-01: Released Pointer Slots Are Zeroed
// =============================================================================

/// Assert that a slot a consumer just finished draining reads back as the
/// null sentinel.
///
/// Used in: `PointerReader::release_read`, `MpscPointerReceiver::read_single`.
macro_rules! debug_assert_slot_zeroed {
    ($val:expr) => {
        debug_assert_eq!($val, 0, "INV-SLOT-01 violated: drained slot did not read back as null")
    };
}

pub(crate) use debug_assert_capacity_bound;
pub(crate) use debug_assert_chunk_claim;
pub(crate) use debug_assert_claim_within_ring;
pub(crate) use debug_assert_released_monotonic;
pub(crate) use debug_assert_slot_zeroed;
