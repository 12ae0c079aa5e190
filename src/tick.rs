//! Monotonic per-core tick counter and the non-yielding busy-wait built on it.
//!
//! Every "claim failed" path in this crate bottoms out in [`pause`]. It never
//! yields to the scheduler — a failed claim is expected to clear in a handful
//! of ticks, and parking a thread would cost far more than it saves.

/// Reads the current value of a monotonic, per-core tick counter.
///
/// On x86/x86_64 this is the TSC. On aarch64 it's the virtual counter
/// register. Elsewhere there's no portable free-running cycle counter, so we
/// fall back to a wall-clock nanosecond count, which is steady but far
/// coarser-grained.
#[inline(always)]
pub(crate) fn read_tick() -> i64 {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: `_rdtsc` is available on every x86_64 target we build for.
        unsafe { std::arch::x86_64::_rdtsc() as i64 }
    }
    #[cfg(target_arch = "x86")]
    {
        // SAFETY: `_rdtsc` is available on every x86 target we build for.
        unsafe { std::arch::x86::_rdtsc() as i64 }
    }
    #[cfg(target_arch = "aarch64")]
    {
        let tick: u64;
        // SAFETY: reading cntvct_el0 has no side effects.
        unsafe {
            std::arch::asm!("mrs {}, cntvct_el0", out(reg) tick, options(nomem, nostack));
        }
        tick as i64
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0)
    }
}

/// Busy-waits until the tick counter has advanced by at least `ticks`.
///
/// `ticks <= 0` returns immediately. Never calls into the scheduler; spins
/// with [`std::hint::spin_loop`] only.
#[inline]
pub(crate) fn pause(ticks: i64) {
    if ticks <= 0 {
        return;
    }
    let start = read_tick();
    while read_tick().wrapping_sub(start) < ticks {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_tick_is_nondecreasing_in_program_order() {
        let a = read_tick();
        let b = read_tick();
        assert!(b >= a);
    }

    #[test]
    fn pause_zero_returns_immediately() {
        pause(0);
        pause(-1);
    }

    #[test]
    fn pause_advances_the_counter() {
        let start = read_tick();
        pause(1000);
        assert!(read_tick().wrapping_sub(start) >= 1000);
    }
}
