//! Loom-based exhaustive interleaving exploration of the `AcquireReleaser`
//! handshake.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! `crate::core::SpscCore` is built on `std::sync::atomic`, not loom's
//! atomics, so it can't be driven directly under loom. This models the same
//! handshake (one `released` counter per side, a private cached snapshot of
//! the opposite side, claim-then-release) with loom's primitives, the same
//! way the teacher crate's `loom_tests.rs` models its ring rather than
//! retrofitting the production type with a loom-swappable atomic layer.

#![cfg(feature = "loom")]

use loom::cell::UnsafeCell;
use loom::sync::atomic::{AtomicI64, Ordering};
use loom::sync::Arc;
use loom::thread;

struct LoomHandshake {
    size: i64,
    mask: i64,
    producer_released: AtomicI64,
    consumer_released: AtomicI64,
    buffer: UnsafeCell<[i64; 4]>,
}

unsafe impl Send for LoomHandshake {}
unsafe impl Sync for LoomHandshake {}

impl LoomHandshake {
    fn new(size: i64) -> Self {
        Self {
            size,
            mask: size - 1,
            producer_released: AtomicI64::new(0),
            consumer_released: AtomicI64::new(0),
            buffer: UnsafeCell::new([0; 4]),
        }
    }

    /// Producer: claims one slot and writes `value`, or returns `false` if
    /// the ring is full.
    fn push(&self, value: i64) -> bool {
        let released = self.producer_released.load(Ordering::Relaxed);
        let consumer = self.consumer_released.load(Ordering::Acquire);
        if released - consumer >= self.size {
            return false;
        }
        let idx = (released & self.mask) as usize;
        // SAFETY: the capacity check above proves this slot was already
        // drained by the consumer (or never written), and no other producer
        // thread exists to race this write.
        self.buffer.with_mut(|ptr| unsafe { (*ptr)[idx] = value });
        self.producer_released.store(released + 1, Ordering::Release);
        true
    }

    /// Consumer: claims and returns one slot's value, or `None` if nothing
    /// has been published yet.
    fn pop(&self) -> Option<i64> {
        let released = self.consumer_released.load(Ordering::Relaxed);
        let producer = self.producer_released.load(Ordering::Acquire);
        if released >= producer {
            return None;
        }
        let idx = (released & self.mask) as usize;
        // SAFETY: `producer > released` proves the producer's `Release`
        // store happened-before this `Acquire` load, so the write at `idx`
        // is visible.
        let value = self.buffer.with(|ptr| unsafe { (*ptr)[idx] });
        self.consumer_released.store(released + 1, Ordering::Release);
        Some(value)
    }
}

#[test]
fn loom_single_producer_single_consumer_sees_every_push() {
    loom::model(|| {
        let q = Arc::new(LoomHandshake::new(4));

        let producer = {
            let q = q.clone();
            thread::spawn(move || {
                for v in 1..=3 {
                    while !q.push(v) {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut seen = Vec::new();
        while seen.len() < 3 {
            if let Some(v) = q.pop() {
                seen.push(v);
            } else {
                thread::yield_now();
            }
        }

        producer.join().unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    });
}

#[test]
fn loom_release_happens_before_opposite_sees_it() {
    loom::model(|| {
        let q = Arc::new(LoomHandshake::new(4));
        let q2 = q.clone();

        let producer = thread::spawn(move || {
            assert!(q.push(99));
        });

        producer.join().unwrap();
        // By now the producer's release has happened-before this load.
        assert_eq!(q2.pop(), Some(99));
    });
}
