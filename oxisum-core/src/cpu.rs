//! CPU capability probe for the accelerated CRC backends.
//!
//! A single runtime query reports which carryless-multiply families the
//! processor offers; the dispatcher turns that into one backend choice per
//! process. Probing is cheap but not free, so the result is cached in a
//! process-wide `OnceLock`.

use std::sync::OnceLock;

/// Acceleration families usable on the current processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    /// 128-bit carryless multiply (x86_64 PCLMULQDQ with SSSE3).
    pub clmul128: bool,
    /// 256-bit vectorized carryless multiply (VPCLMULQDQ with AVX2).
    pub vclmul256: bool,
    /// 512-bit vectorized carryless multiply (VPCLMULQDQ with AVX-512F/BW).
    pub vclmul512: bool,
    /// ARM polynomial multiply (aarch64 PMULL, part of the crypto extensions).
    pub pmull: bool,
}

impl CpuFeatures {
    /// Probe the current processor.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            let clmul128 =
                is_x86_feature_detected!("pclmulqdq") && is_x86_feature_detected!("ssse3");
            let vclmul = is_x86_feature_detected!("vpclmulqdq");
            Self {
                clmul128,
                vclmul256: clmul128 && vclmul && is_x86_feature_detected!("avx2"),
                vclmul512: clmul128
                    && vclmul
                    && is_x86_feature_detected!("avx512f")
                    && is_x86_feature_detected!("avx512bw"),
                pmull: false,
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self {
                clmul128: false,
                vclmul256: false,
                vclmul512: false,
                pmull: std::arch::is_aarch64_feature_detected!("aes"),
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {
                clmul128: false,
                vclmul256: false,
                vclmul512: false,
                pmull: false,
            }
        }
    }

    /// Cached probe result for this process.
    pub fn get() -> Self {
        static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();
        *FEATURES.get_or_init(Self::detect)
    }

    /// No acceleration at all; useful for forcing the scalar paths.
    pub fn none() -> Self {
        Self {
            clmul128: false,
            vclmul256: false,
            vclmul512: false,
            pmull: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_does_not_panic() {
        let f = CpuFeatures::detect();
        // Wider families imply the narrower one on x86_64
        if f.vclmul256 || f.vclmul512 {
            assert!(f.clmul128);
        }
    }

    #[test]
    fn cached_probe_is_stable() {
        assert_eq!(CpuFeatures::get(), CpuFeatures::get());
    }
}
