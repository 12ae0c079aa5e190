//! Configuration-failure errors.
//!
//! These are the only `Result`-worthy failures in this crate. A queue that
//! temporarily has no capacity to claim is not an error — see each queue
//! module's `acquire_*`/`write`/`read` return types.

use thiserror::Error;

/// A queue could not be constructed because its configuration was invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ring size {size} must be at least 1")]
    SizeTooSmall { size: i64 },
    #[error("ring size {size} is not a power of two")]
    NotPowerOfTwo { size: i64 },
    #[error("ring size {size} exceeds the maximum of {max} (2^41)")]
    SizeTooLarge { size: i64, max: i64 },
    #[error("chunk size {chunk} must be at least 1")]
    ChunkTooSmall { chunk: i64 },
    #[error("chunk size {chunk} does not evenly divide ring size {size}")]
    ChunkNotDivisor { size: i64, chunk: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ConfigError::NotPowerOfTwo { size: 6 };
        assert_eq!(err.to_string(), "ring size 6 is not a power of two");
    }
}
