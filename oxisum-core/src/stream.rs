//! Stream driver: feed a byte source through a backend to a finished
//! checksum.
//!
//! The driver owns the block buffer (sized for the backend), reads full
//! blocks with interrupted-read retry, tracks the total length with overflow
//! detection, and performs the POSIX post-processing. Buffers live only for
//! the duration of one call, however it terminates.

use std::io::{self, Read};

use crate::crc::{Checksum, finalize_raw};
use crate::dispatch::{Backend, Engine};
use crate::error::{CksumError, Result};

/// Fill `buf` as far as the source allows, retrying on `Interrupted`.
///
/// A short count means end of stream: `Read` contracts that 0 is only
/// returned at EOF, and we keep asking until then.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Checksum a byte source with the process-global backend.
pub fn checksum_reader<R: Read>(reader: R) -> Result<Checksum> {
    checksum_reader_with(Backend::auto(), reader)
}

/// Checksum a byte source with an explicit backend.
///
/// Every backend yields the identical checksum; this entry point exists for
/// cross-checking and benchmarks.
pub fn checksum_reader_with<R: Read>(backend: Backend, mut reader: R) -> Result<Checksum> {
    let mut engine = Engine::with_backend(backend);
    let block_size = engine.block_size();
    let mut buf = vec![0u8; block_size];
    let mut crc = 0u32;
    let mut length = 0u64;

    loop {
        let n = read_full(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        length = length
            .checked_add(n as u64)
            .ok_or(CksumError::LengthOverflow)?;
        crc = engine.update_block(crc, &mut buf[..n]);
        if n < block_size {
            // Short read is EOF; don't poke the source again
            break;
        }
    }

    Ok(Checksum {
        crc: finalize_raw(crc, length),
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::Cksum;
    use std::io::Cursor;

    #[test]
    fn matches_the_incremental_hasher() {
        let data: Vec<u8> = (0..200_000u32)
            .map(|i| i.wrapping_mul(2654435761) as u8)
            .collect();
        let want = Cksum::compute(&data);
        let got = checksum_reader(Cursor::new(&data)).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn empty_source() {
        let sum = checksum_reader(io::empty()).unwrap();
        assert_eq!(sum.crc, 0xFFFF_FFFF);
        assert_eq!(sum.length, 0);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        struct Flaky {
            data: Vec<u8>,
            pos: usize,
            hiccups: usize,
        }
        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.hiccups > 0 {
                    self.hiccups -= 1;
                    return Err(io::Error::from(io::ErrorKind::Interrupted));
                }
                self.hiccups = 2;
                let n = buf.len().min(37).min(self.data.len() - self.pos);
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
        }
        let data = b"interrupted but otherwise ordinary input".repeat(50);
        let want = Cksum::compute(&data);
        let got = checksum_reader(Flaky {
            data: data.clone(),
            pos: 0,
            hiccups: 1,
        })
        .unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn transport_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        assert!(matches!(
            checksum_reader(Broken),
            Err(CksumError::Io(_))
        ));
    }

    #[test]
    fn every_available_backend_streams_identically() {
        let data: Vec<u8> = (0..300_000u32).map(|i| (i ^ 0xA5) as u8).collect();
        let want = Cksum::compute(&data);
        for &backend in Backend::all() {
            if !backend.is_available() {
                continue;
            }
            let got = checksum_reader_with(backend, Cursor::new(&data)).unwrap();
            assert_eq!(got, want, "backend {}", backend.label());
        }
    }
}
