//! Bounded, lock-free ring-buffer queues for very low-latency in-process
//! message passing.
//!
//! Every queue shape in this crate is built on one SPSC handshake (see
//! [`core`]): a pair of sequence counters, one per side, each caching a
//! private snapshot of the other's watermark so the common case never
//! touches a shared cache line. The queue-specific layers on top
//! ([`byte_queue`], [`chunk_queue`], [`msg_queue`], [`pointer_queue`]) only
//! add framing; none of them re-derive the handshake.
//!
//! [`mpsc_pointer_queue`] is the one exception: with more than one producer
//! thread the handshake's single-writer assumption doesn't hold, so it
//! swaps the producer-side sequence counter for a per-slot compare-exchange
//! against a null sentinel.
//!
//! # Which queue do I want?
//!
//! - Raw bytes, no framing of your own: [`byte_queue::byte_queue`].
//! - Fixed-size frames: [`chunk_queue::chunk_queue`].
//! - Variable-length messages: [`msg_queue::msg_queue`].
//! - Machine-word values, single producer: [`pointer_queue::pointer_queue`].
//! - Machine-word values, multiple producers:
//!   [`mpsc_pointer_queue::mpsc_pointer_queue`].
//!
//! # Non-blocking contract
//!
//! Nothing in this crate blocks on a kernel primitive. A claim that can't be
//! satisfied right now returns an empty slice, `None`, or `false` — paired
//! with a `failed` counter bump and a [`tick::pause`] backoff — and it's the
//! caller's job to retry, yield, or give up. The `_blocking` convenience
//! methods on the pointer queues are just a spin-retry loop around that
//! contract, not a different primitive.
//!
//! # Example
//!
//! ```
//! use ringqueues::byte_queue::byte_queue;
//! use ringqueues::config::QueueConfig;
//!
//! let (writer, reader) = byte_queue(QueueConfig::new(1024, 0)).unwrap();
//! assert!(writer.write(b"hello"));
//! let mut out = [0u8; 5];
//! assert!(reader.read(&mut out));
//! assert_eq!(&out, b"hello");
//! ```

pub mod byte_queue;
pub mod cacheline;
pub mod chunk_queue;
pub mod config;
pub(crate) mod core;
pub mod error;
pub(crate) mod invariants;
pub mod mpsc_pointer_queue;
pub mod msg_queue;
pub mod pointer_queue;
pub(crate) mod ring_storage;
pub(crate) mod tick;

pub use byte_queue::{byte_queue, ByteReader, ByteWriter};
pub use chunk_queue::{chunk_queue, ChunkReader, ChunkWriter};
pub use config::{QueueConfig, HIGH_THROUGHPUT, LOW_LATENCY, MAX_SIZE};
pub use error::ConfigError;
pub use mpsc_pointer_queue::{mpsc_pointer_queue, MpscPointerReceiver, MpscPointerSender};
pub use msg_queue::{msg_queue, MsgReader, MsgWriter};
pub use pointer_queue::{pointer_queue, ClaimedSlots, PointerReader, PointerWriter};
