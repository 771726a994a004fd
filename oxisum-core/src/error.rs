//! Error types for OxiSum operations.

use std::io;
use thiserror::Error;

/// The main error type for checksum operations.
#[derive(Debug, Error)]
pub enum CksumError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The accumulated byte count no longer fits the 64-bit length counter.
    ///
    /// The POSIX checksum folds the total length into the CRC, so a wrapped
    /// counter would silently corrupt the result; the stream is abandoned
    /// instead and no partial checksum is produced.
    #[error("input length exceeds {max} bytes", max = u64::MAX)]
    LengthOverflow,
}

/// Result type alias for OxiSum operations.
pub type Result<T> = std::result::Result<T, CksumError>;
