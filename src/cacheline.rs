//! Cache-line size constant shared by the hand-padded ring storage.
//!
//! Atomic counters are padded with [`crossbeam_utils::CachePadded`]; this
//! constant is for padding the ring/slot storage allocations themselves (see
//! [`crate::ring_storage`]), which guards against a different hazard — a
//! neighboring heap allocation landing on the same cache line as the ring's
//! first or last element, not a neighboring struct field.

const DEFAULT_CACHE_LINE: usize = if cfg!(target_arch = "aarch64") { 128 } else { 64 };

/// Parses a decimal `usize` from `option_env!("RINGQUEUES_CACHE_LINE")` at
/// compile time, falling back to `default` on anything not a bare positive
/// integer. No `build.rs` needed: set the env var in the build environment
/// (e.g. `RINGQUEUES_CACHE_LINE=128 cargo build`) to override.
const fn parse_override(default: usize) -> usize {
    match option_env!("RINGQUEUES_CACHE_LINE") {
        None => default,
        Some(s) => {
            let bytes = s.as_bytes();
            if bytes.is_empty() {
                return default;
            }
            let mut value: usize = 0;
            let mut i = 0;
            while i < bytes.len() {
                let b = bytes[i];
                if b < b'0' || b > b'9' {
                    return default;
                }
                value = value * 10 + (b - b'0') as usize;
                i += 1;
            }
            if value == 0 {
                default
            } else {
                value
            }
        }
    }
}

/// Cache line size in bytes, used to pad ring storage on both ends.
///
/// 128 on `aarch64` (covers known big.LITTLE / Apple Silicon prefetch
/// behavior that reads two lines at a time), 64 everywhere else. Overridable
/// at build time via the `RINGQUEUES_CACHE_LINE` env var (see §6 of
/// `SPEC_FULL.md`); an unparseable or absent value falls back to the
/// architecture default.
pub const CACHE_LINE: usize = parse_override(DEFAULT_CACHE_LINE);
