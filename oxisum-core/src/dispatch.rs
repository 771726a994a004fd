//! Backend selection and the per-stream engine.
//!
//! The dispatcher decides once per process which backend services block
//! updates, based on the capability probe; the decision is stored behind a
//! `OnceLock` so concurrent first calls race to a single consistent choice.
//! An [`Engine`] pairs the chosen backend with its per-stream scratch (the
//! Chorba bit-buffer) and is the only way accelerated code runs: requesting
//! a backend the processor cannot execute silently falls back to scalar
//! slice-by-8.

use std::sync::OnceLock;

use crate::chorba::{self, BitBuffer};
use crate::cpu::CpuFeatures;
use crate::crc::update_slice8;

/// The CRC backends, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Table-driven scalar reference path.
    Slice8,
    /// Shift/XOR pre-reduction, no lookup tables in the hot loop.
    Chorba,
    /// 128-bit carryless-multiply folding (x86_64 PCLMULQDQ).
    Clmul128,
    /// 256-bit vectorized folding (VPCLMULQDQ + AVX2).
    VClmul256,
    /// 512-bit vectorized folding (VPCLMULQDQ + AVX-512).
    VClmul512,
    /// 128-bit folding via the aarch64 polynomial multiplier.
    Pmull,
}

impl Backend {
    /// Every backend, for exhaustive cross-checking.
    pub fn all() -> &'static [Backend] {
        &[
            Backend::Slice8,
            Backend::Chorba,
            Backend::Clmul128,
            Backend::VClmul256,
            Backend::VClmul512,
            Backend::Pmull,
        ]
    }

    /// The process-global choice, decided on first use.
    pub fn auto() -> Backend {
        static CHOICE: OnceLock<Backend> = OnceLock::new();
        *CHOICE.get_or_init(|| Backend::best_available(CpuFeatures::get()))
    }

    /// Preferred backend for a capability set: widest vector unit first,
    /// then the scalar default.
    ///
    /// The scalar default is slice-by-8, or Chorba when the `chorba` cargo
    /// feature selects it at build time.
    pub fn best_available(features: CpuFeatures) -> Backend {
        if features.vclmul512 {
            Backend::VClmul512
        } else if features.vclmul256 {
            Backend::VClmul256
        } else if features.clmul128 {
            Backend::Clmul128
        } else if features.pmull {
            Backend::Pmull
        } else if cfg!(feature = "chorba") {
            Backend::Chorba
        } else {
            Backend::Slice8
        }
    }

    /// Whether this backend can run on the current processor.
    pub fn is_available(self) -> bool {
        let features = CpuFeatures::get();
        match self {
            Backend::Slice8 | Backend::Chorba => true,
            Backend::Clmul128 => features.clmul128,
            Backend::VClmul256 => features.vclmul256,
            Backend::VClmul512 => features.vclmul512,
            Backend::Pmull => features.pmull,
        }
    }

    /// Human-readable name, used by diagnostics and benches.
    pub fn label(self) -> &'static str {
        match self {
            Backend::Slice8 => "slice8",
            Backend::Chorba => "chorba",
            Backend::Clmul128 => "clmul128",
            Backend::VClmul256 => "vclmul256",
            Backend::VClmul512 => "vclmul512",
            Backend::Pmull => "pmull",
        }
    }

    /// Block size the stream driver should feed this backend.
    pub(crate) fn block_size(self) -> usize {
        match self {
            // One fold pass consumes well under 64 KiB, so the historical
            // cksum buffer size holds
            Backend::Clmul128 | Backend::Pmull => 64 * 1024,
            _ => 1024 * 1024,
        }
    }
}

/// Per-stream CRC engine: a backend plus its private scratch.
pub struct Engine {
    backend: Backend,
    bitbuf: Option<BitBuffer>,
}

impl Engine {
    /// Engine on the process-global backend choice.
    pub fn new() -> Self {
        Self::with_backend(Backend::auto())
    }

    /// Engine on an explicit backend.
    ///
    /// Falls back to scalar slice-by-8 if the processor lacks the features
    /// the requested backend needs.
    pub fn with_backend(backend: Backend) -> Self {
        let backend = if backend.is_available() {
            backend
        } else {
            Backend::Slice8
        };
        let bitbuf = match backend {
            Backend::Chorba => Some(BitBuffer::new()),
            _ => None,
        };
        Self { backend, bitbuf }
    }

    /// The backend actually in use.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Block size the stream driver should use with this engine.
    pub fn block_size(&self) -> usize {
        self.backend.block_size()
    }

    /// Advance the raw CRC over one block. The block is scratch space: the
    /// folding backends byte-swap and store into it in place.
    pub fn update_block(&mut self, crc: u32, block: &mut [u8]) -> u32 {
        match self.backend {
            Backend::Slice8 => update_slice8(crc, block),
            Backend::Chorba => {
                // with_backend always pairs Chorba with a bit-buffer
                let bitbuf = self.bitbuf.get_or_insert_with(BitBuffer::new);
                chorba::update_block(crc, block, bitbuf)
            }
            #[cfg(target_arch = "x86_64")]
            // SAFETY: with_backend verified the CPU features for this kind
            Backend::Clmul128 => unsafe { crate::crc_simd::x86::update_block_clmul128(crc, block) },
            #[cfg(target_arch = "x86_64")]
            // SAFETY: as above
            Backend::VClmul256 => unsafe {
                crate::crc_simd::x86::update_block_vclmul256(crc, block)
            },
            #[cfg(target_arch = "x86_64")]
            // SAFETY: as above
            Backend::VClmul512 => unsafe {
                crate::crc_simd::x86::update_block_vclmul512(crc, block)
            },
            #[cfg(target_arch = "aarch64")]
            // SAFETY: as above
            Backend::Pmull => unsafe { crate::crc_simd::arm::update_block_pmull(crc, block) },
            // Unreachable after with_backend normalization; keeps the match
            // exhaustive on every architecture
            _ => update_slice8(crc, block),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_choice_is_stable_and_available() {
        let first = Backend::auto();
        assert_eq!(first, Backend::auto());
        assert!(first.is_available());
    }

    #[test]
    fn preference_order() {
        let mut f = CpuFeatures {
            clmul128: true,
            vclmul256: true,
            vclmul512: true,
            pmull: false,
        };
        assert_eq!(Backend::best_available(f), Backend::VClmul512);
        f.vclmul512 = false;
        assert_eq!(Backend::best_available(f), Backend::VClmul256);
        f.vclmul256 = false;
        assert_eq!(Backend::best_available(f), Backend::Clmul128);
        f.clmul128 = false;
        f.pmull = true;
        assert_eq!(Backend::best_available(f), Backend::Pmull);
    }

    #[test]
    fn no_features_selects_the_scalar_default() {
        let choice = Backend::best_available(CpuFeatures::none());
        if cfg!(feature = "chorba") {
            assert_eq!(choice, Backend::Chorba);
        } else {
            assert_eq!(choice, Backend::Slice8);
        }
    }

    #[test]
    fn unavailable_backend_falls_back_to_scalar() {
        for &backend in Backend::all() {
            let engine = Engine::with_backend(backend);
            assert!(engine.backend().is_available());
            if !backend.is_available() {
                assert_eq!(engine.backend(), Backend::Slice8);
            }
        }
    }

    #[test]
    fn every_available_backend_agrees_on_a_block() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i ^ (i >> 3)) as u8).collect();
        let want = update_slice8(0, &data);
        for &backend in Backend::all() {
            if !backend.is_available() {
                continue;
            }
            let mut engine = Engine::with_backend(backend);
            let got = engine.update_block(0, &mut data.clone());
            assert_eq!(got, want, "backend {}", backend.label());
        }
    }
}
