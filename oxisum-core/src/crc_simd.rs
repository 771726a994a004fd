//! Carryless-multiply CRC backends.
//!
//! Each backend folds the block through wide registers: a value V occupying a
//! position n bytes before position p contributes exactly what `V · x^(8n)
//! mod G` contributes at p, so one carryless multiply per 64-bit half moves a
//! whole register forward by the stride. The chain is the classic four-lane
//! wide loop followed by single-register strides of decreasing width; each
//! phase stores its folded registers back into the buffer (byte-swapped to
//! memory order) so the next phase, and finally the byte-wise tail, can
//! continue in place.
//!
//! Register layout is per-16-byte sublane: every 16-byte group is reversed
//! in place into big-endian polynomial order, never the whole vector, so the
//! same fold constants serve all three widths. The incoming CRC is XORed
//! into bits 96..=127 of the first sublane of the first register, the
//! polynomial slot of the first four input bytes. CLMUL immediates 0x00 and
//! 0x11 select the low·low and high·high products.
//!
//! All functions here require their CPU features at runtime; the dispatcher
//! only hands out backends the capability probe approved.

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86 {
    use crate::crc::update_bytewise;
    use crate::tables::{
        K_FOLD_16, K_FOLD_16H, K_FOLD_32, K_FOLD_32H, K_FOLD_64, K_FOLD_64H, K_FOLD_128,
        K_FOLD_128H, K_FOLD_256, K_FOLD_256H,
    };
    use core::arch::x86_64::*;

    /// Byte-reversal shuffle mask for one 16-byte lane.
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn lane_reverse() -> __m128i {
        unsafe { _mm_set_epi8(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15) }
    }

    #[inline]
    #[target_feature(enable = "sse2,ssse3")]
    unsafe fn load_swapped(ptr: *const u8, m: __m128i) -> __m128i {
        unsafe { _mm_shuffle_epi8(_mm_loadu_si128(ptr.cast()), m) }
    }

    #[inline]
    #[target_feature(enable = "sse2,ssse3")]
    unsafe fn store_swapped(ptr: *mut u8, v: __m128i, m: __m128i) {
        unsafe { _mm_storeu_si128(ptr.cast(), _mm_shuffle_epi8(v, m)) }
    }

    /// Fold one 128-bit register forward by the stride encoded in `k`,
    /// absorbing the next block.
    #[inline]
    #[target_feature(enable = "sse2,pclmulqdq")]
    unsafe fn fold(d: __m128i, k: __m128i, next: __m128i) -> __m128i {
        unsafe {
            let lo = _mm_clmulepi64_si128(d, k, 0x00);
            let hi = _mm_clmulepi64_si128(d, k, 0x11);
            _mm_xor_si128(_mm_xor_si128(lo, hi), next)
        }
    }

    /// 128-bit fold chain: 4×16-byte lanes at a 64-byte stride, one lane at
    /// a 16-byte stride, byte-wise tail.
    ///
    /// # Safety
    ///
    /// Requires SSSE3 and PCLMULQDQ.
    #[target_feature(enable = "sse2,ssse3,pclmulqdq")]
    pub(crate) unsafe fn update_block_clmul128(mut crc: u32, buf: &mut [u8]) -> u32 {
        unsafe {
            let m = lane_reverse();
            let len = buf.len();
            let ptr = buf.as_mut_ptr();
            let mut pos = 0usize;

            if len >= 128 {
                let quad = _mm_set_epi64x(K_FOLD_64H as i64, K_FOLD_64 as i64);
                let mut d0 = load_swapped(ptr, m);
                let mut d1 = load_swapped(ptr.add(16), m);
                let mut d2 = load_swapped(ptr.add(32), m);
                let mut d3 = load_swapped(ptr.add(48), m);
                d0 = _mm_xor_si128(d0, _mm_set_epi32(crc as i32, 0, 0, 0));
                crc = 0;
                pos = 64;
                while len - pos >= 64 {
                    d0 = fold(d0, quad, load_swapped(ptr.add(pos), m));
                    d1 = fold(d1, quad, load_swapped(ptr.add(pos + 16), m));
                    d2 = fold(d2, quad, load_swapped(ptr.add(pos + 32), m));
                    d3 = fold(d3, quad, load_swapped(ptr.add(pos + 48), m));
                    pos += 64;
                }
                pos -= 64;
                store_swapped(ptr.add(pos), d0, m);
                store_swapped(ptr.add(pos + 16), d1, m);
                store_swapped(ptr.add(pos + 32), d2, m);
                store_swapped(ptr.add(pos + 48), d3, m);
            }

            if len - pos >= 32 {
                let single = _mm_set_epi64x(K_FOLD_16H as i64, K_FOLD_16 as i64);
                let mut d = load_swapped(ptr.add(pos), m);
                d = _mm_xor_si128(d, _mm_set_epi32(crc as i32, 0, 0, 0));
                crc = 0;
                pos += 16;
                while len - pos >= 16 {
                    d = fold(d, single, load_swapped(ptr.add(pos), m));
                    pos += 16;
                }
                pos -= 16;
                store_swapped(ptr.add(pos), d, m);
            }

            update_bytewise(crc, &buf[pos..])
        }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn load_swapped256(ptr: *const u8, m: __m256i) -> __m256i {
        unsafe { _mm256_shuffle_epi8(_mm256_loadu_si256(ptr.cast()), m) }
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn store_swapped256(ptr: *mut u8, v: __m256i, m: __m256i) {
        unsafe { _mm256_storeu_si256(ptr.cast(), _mm256_shuffle_epi8(v, m)) }
    }

    #[inline]
    #[target_feature(enable = "avx2,vpclmulqdq")]
    unsafe fn fold256(d: __m256i, k: __m256i, next: __m256i) -> __m256i {
        unsafe {
            let lo = _mm256_clmulepi64_epi128(d, k, 0x00);
            let hi = _mm256_clmulepi64_epi128(d, k, 0x11);
            _mm256_xor_si256(_mm256_xor_si256(lo, hi), next)
        }
    }

    /// 256-bit fold chain: 4×32-byte lanes at a 128-byte stride, one lane at
    /// a 32-byte stride, then the 128-bit chain on what is left.
    ///
    /// # Safety
    ///
    /// Requires AVX2 and VPCLMULQDQ (plus the 128-bit chain's features).
    #[target_feature(enable = "sse2,ssse3,pclmulqdq,avx2,vpclmulqdq")]
    pub(crate) unsafe fn update_block_vclmul256(mut crc: u32, buf: &mut [u8]) -> u32 {
        unsafe {
            let m = _mm256_broadcastsi128_si256(lane_reverse());
            let len = buf.len();
            let ptr = buf.as_mut_ptr();
            let mut pos = 0usize;

            if len >= 256 {
                let quad = _mm256_set_epi64x(
                    K_FOLD_128H as i64,
                    K_FOLD_128 as i64,
                    K_FOLD_128H as i64,
                    K_FOLD_128 as i64,
                );
                let mut d0 = load_swapped256(ptr, m);
                let mut d1 = load_swapped256(ptr.add(32), m);
                let mut d2 = load_swapped256(ptr.add(64), m);
                let mut d3 = load_swapped256(ptr.add(96), m);
                d0 = _mm256_xor_si256(
                    d0,
                    _mm256_set_epi32(0, 0, 0, 0, crc as i32, 0, 0, 0),
                );
                crc = 0;
                pos = 128;
                while len - pos >= 128 {
                    d0 = fold256(d0, quad, load_swapped256(ptr.add(pos), m));
                    d1 = fold256(d1, quad, load_swapped256(ptr.add(pos + 32), m));
                    d2 = fold256(d2, quad, load_swapped256(ptr.add(pos + 64), m));
                    d3 = fold256(d3, quad, load_swapped256(ptr.add(pos + 96), m));
                    pos += 128;
                }
                pos -= 128;
                store_swapped256(ptr.add(pos), d0, m);
                store_swapped256(ptr.add(pos + 32), d1, m);
                store_swapped256(ptr.add(pos + 64), d2, m);
                store_swapped256(ptr.add(pos + 96), d3, m);
            }

            if len - pos >= 64 {
                let single = _mm256_set_epi64x(
                    K_FOLD_32H as i64,
                    K_FOLD_32 as i64,
                    K_FOLD_32H as i64,
                    K_FOLD_32 as i64,
                );
                let mut d = load_swapped256(ptr.add(pos), m);
                d = _mm256_xor_si256(d, _mm256_set_epi32(0, 0, 0, 0, crc as i32, 0, 0, 0));
                crc = 0;
                pos += 32;
                while len - pos >= 32 {
                    d = fold256(d, single, load_swapped256(ptr.add(pos), m));
                    pos += 32;
                }
                pos -= 32;
                store_swapped256(ptr.add(pos), d, m);
            }

            update_block_clmul128(crc, &mut buf[pos..])
        }
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw")]
    unsafe fn load_swapped512(ptr: *const u8, m: __m512i) -> __m512i {
        unsafe { _mm512_shuffle_epi8(_mm512_loadu_si512(ptr.cast()), m) }
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw")]
    unsafe fn store_swapped512(ptr: *mut u8, v: __m512i, m: __m512i) {
        unsafe { _mm512_storeu_si512(ptr.cast(), _mm512_shuffle_epi8(v, m)) }
    }

    #[inline]
    #[target_feature(enable = "avx512f,vpclmulqdq")]
    unsafe fn fold512(d: __m512i, k: __m512i, next: __m512i) -> __m512i {
        unsafe {
            let lo = _mm512_clmulepi64_epi128(d, k, 0x00);
            let hi = _mm512_clmulepi64_epi128(d, k, 0x11);
            _mm512_xor_si512(_mm512_xor_si512(lo, hi), next)
        }
    }

    /// 512-bit fold chain: 4×64-byte lanes at a 256-byte stride, one lane at
    /// a 64-byte stride, then the 256-bit chain on what is left.
    ///
    /// # Safety
    ///
    /// Requires AVX-512F/BW and VPCLMULQDQ (plus the narrower chains'
    /// features).
    #[target_feature(enable = "sse2,ssse3,pclmulqdq,avx2,avx512f,avx512bw,vpclmulqdq")]
    pub(crate) unsafe fn update_block_vclmul512(mut crc: u32, buf: &mut [u8]) -> u32 {
        unsafe {
            let m = _mm512_broadcast_i32x4(lane_reverse());
            let len = buf.len();
            let ptr = buf.as_mut_ptr();
            let mut pos = 0usize;

            if len >= 512 {
                let quad = _mm512_set_epi64(
                    K_FOLD_256H as i64,
                    K_FOLD_256 as i64,
                    K_FOLD_256H as i64,
                    K_FOLD_256 as i64,
                    K_FOLD_256H as i64,
                    K_FOLD_256 as i64,
                    K_FOLD_256H as i64,
                    K_FOLD_256 as i64,
                );
                let mut d0 = load_swapped512(ptr, m);
                let mut d1 = load_swapped512(ptr.add(64), m);
                let mut d2 = load_swapped512(ptr.add(128), m);
                let mut d3 = load_swapped512(ptr.add(192), m);
                d0 = _mm512_xor_si512(
                    d0,
                    _mm512_set_epi32(
                        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, crc as i32, 0, 0, 0,
                    ),
                );
                crc = 0;
                pos = 256;
                while len - pos >= 256 {
                    d0 = fold512(d0, quad, load_swapped512(ptr.add(pos), m));
                    d1 = fold512(d1, quad, load_swapped512(ptr.add(pos + 64), m));
                    d2 = fold512(d2, quad, load_swapped512(ptr.add(pos + 128), m));
                    d3 = fold512(d3, quad, load_swapped512(ptr.add(pos + 192), m));
                    pos += 256;
                }
                pos -= 256;
                store_swapped512(ptr.add(pos), d0, m);
                store_swapped512(ptr.add(pos + 64), d1, m);
                store_swapped512(ptr.add(pos + 128), d2, m);
                store_swapped512(ptr.add(pos + 192), d3, m);
            }

            if len - pos >= 128 {
                let single = _mm512_set_epi64(
                    K_FOLD_64H as i64,
                    K_FOLD_64 as i64,
                    K_FOLD_64H as i64,
                    K_FOLD_64 as i64,
                    K_FOLD_64H as i64,
                    K_FOLD_64 as i64,
                    K_FOLD_64H as i64,
                    K_FOLD_64 as i64,
                );
                let mut d = load_swapped512(ptr.add(pos), m);
                d = _mm512_xor_si512(
                    d,
                    _mm512_set_epi32(
                        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, crc as i32, 0, 0, 0,
                    ),
                );
                crc = 0;
                pos += 64;
                while len - pos >= 64 {
                    d = fold512(d, single, load_swapped512(ptr.add(pos), m));
                    pos += 64;
                }
                pos -= 64;
                store_swapped512(ptr.add(pos), d, m);
            }

            update_block_vclmul256(crc, &mut buf[pos..])
        }
    }
}

#[cfg(target_arch = "aarch64")]
pub(crate) mod arm {
    use crate::crc::update_bytewise;
    use crate::tables::{K_FOLD_16, K_FOLD_16H, K_FOLD_64, K_FOLD_64H};
    use core::arch::aarch64::*;

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn lane_reverse() -> uint8x16_t {
        const REV: [u8; 16] = [15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
        unsafe { vld1q_u8(REV.as_ptr()) }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn load_swapped(ptr: *const u8, m: uint8x16_t) -> uint8x16_t {
        unsafe { vqtbl1q_u8(vld1q_u8(ptr), m) }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn store_swapped(ptr: *mut u8, v: uint8x16_t, m: uint8x16_t) {
        unsafe { vst1q_u8(ptr, vqtbl1q_u8(v, m)) }
    }

    /// Fold one 128-bit register forward, absorbing the next block.
    #[inline]
    #[target_feature(enable = "neon,aes")]
    unsafe fn fold(d: uint8x16_t, k_lo: u64, k_hi: u64, next: uint8x16_t) -> uint8x16_t {
        unsafe {
            let d64 = vreinterpretq_u64_u8(d);
            let lo = vmull_p64(vgetq_lane_u64::<0>(d64), k_lo);
            let hi = vmull_p64(vgetq_lane_u64::<1>(d64), k_hi);
            veorq_u8(
                veorq_u8(vreinterpretq_u8_p128(lo), vreinterpretq_u8_p128(hi)),
                next,
            )
        }
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn inject_crc(d: uint8x16_t, crc: u32) -> uint8x16_t {
        unsafe {
            veorq_u8(
                d,
                vreinterpretq_u8_u32(vsetq_lane_u32::<3>(crc, vdupq_n_u32(0))),
            )
        }
    }

    /// 128-bit fold chain via PMULL, mirroring the x86_64 CLMUL128 backend.
    ///
    /// # Safety
    ///
    /// Requires NEON and the polynomial-multiply crypto extension.
    #[target_feature(enable = "neon,aes")]
    pub(crate) unsafe fn update_block_pmull(mut crc: u32, buf: &mut [u8]) -> u32 {
        unsafe {
            let m = lane_reverse();
            let len = buf.len();
            let ptr = buf.as_mut_ptr();
            let mut pos = 0usize;

            if len >= 128 {
                let (k_lo, k_hi) = (K_FOLD_64 as u64, K_FOLD_64H as u64);
                let mut d0 = load_swapped(ptr, m);
                let mut d1 = load_swapped(ptr.add(16), m);
                let mut d2 = load_swapped(ptr.add(32), m);
                let mut d3 = load_swapped(ptr.add(48), m);
                d0 = inject_crc(d0, crc);
                crc = 0;
                pos = 64;
                while len - pos >= 64 {
                    d0 = fold(d0, k_lo, k_hi, load_swapped(ptr.add(pos), m));
                    d1 = fold(d1, k_lo, k_hi, load_swapped(ptr.add(pos + 16), m));
                    d2 = fold(d2, k_lo, k_hi, load_swapped(ptr.add(pos + 32), m));
                    d3 = fold(d3, k_lo, k_hi, load_swapped(ptr.add(pos + 48), m));
                    pos += 64;
                }
                pos -= 64;
                store_swapped(ptr.add(pos), d0, m);
                store_swapped(ptr.add(pos + 16), d1, m);
                store_swapped(ptr.add(pos + 32), d2, m);
                store_swapped(ptr.add(pos + 48), d3, m);
            }

            if len - pos >= 32 {
                let (k_lo, k_hi) = (K_FOLD_16 as u64, K_FOLD_16H as u64);
                let mut d = load_swapped(ptr.add(pos), m);
                d = inject_crc(d, crc);
                crc = 0;
                pos += 16;
                while len - pos >= 16 {
                    d = fold(d, k_lo, k_hi, load_swapped(ptr.add(pos), m));
                    pos += 16;
                }
                pos -= 16;
                store_swapped(ptr.add(pos), d, m);
            }

            update_bytewise(crc, &buf[pos..])
        }
    }
}
