//! # OxiSum Core
//!
//! Core components for the OxiSum checksum engine.
//!
//! This crate computes the POSIX `cksum` CRC-32 and byte length of arbitrary
//! byte streams:
//!
//! - [`tables`]: compile-time slice-by-8 tables and fold constants
//! - [`cpu`]: runtime capability probe for the accelerated backends
//! - [`crc`]: the scalar reference engine and the public [`crc::Cksum`] hasher
//! - `chorba`: shift/XOR pre-reduction for hardware without carryless
//!   multiply (select it via [`dispatch::Backend::Chorba`])
//! - `crc_simd`: 128/256/512-bit carryless-multiply fold backends
//! - [`dispatch`]: one-backend-per-process selection and the per-stream engine
//! - [`stream`]: the block-reading driver that turns any `Read` into a
//!   finished checksum
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI / library callers                                   │
//! ├─────────────────────────────────────────────────────────┤
//! │ stream: block reads, length tracking, length fold, ~    │
//! ├─────────────────────────────────────────────────────────┤
//! │ dispatch: capability probe → one backend per process    │
//! ├─────────────────────────────────────────────────────────┤
//! │ backends: slice8 │ chorba │ clmul 128/256/512 │ pmull   │
//! ├─────────────────────────────────────────────────────────┤
//! │ tables: 8×256 lookup table, x^n mod G fold constants    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every backend produces the identical CRC for every input; the accelerated
//! paths exist only for throughput.
//!
//! ## Example
//!
//! ```rust
//! use oxisum_core::crc::Cksum;
//! use oxisum_core::stream::checksum_reader;
//!
//! let sum = Cksum::compute(b"abc");
//! assert_eq!((sum.crc, sum.length), (0x48AA78A2, 3));
//!
//! let streamed = checksum_reader(&b"abc"[..]).unwrap();
//! assert_eq!(streamed, sum);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chorba;
mod crc_simd;

pub mod cpu;
pub mod crc;
pub mod dispatch;
pub mod error;
pub mod stream;
pub mod tables;

// Re-exports for convenience
pub use cpu::CpuFeatures;
pub use crc::{Checksum, Cksum};
pub use dispatch::{Backend, Engine};
pub use error::{CksumError, Result};
pub use stream::{checksum_reader, checksum_reader_with};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cpu::CpuFeatures;
    pub use crate::crc::{Checksum, Cksum};
    pub use crate::dispatch::{Backend, Engine};
    pub use crate::error::{CksumError, Result};
    pub use crate::stream::{checksum_reader, checksum_reader_with};
}
