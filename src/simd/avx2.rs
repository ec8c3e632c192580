//! AVX2 (256-bit) SIMD kernel for x86_64 word operations.
//!
//! Each register holds four `u64` words. Tails that don't fill a full
//! register fall through to scalar code.

use super::{IsaLevel, VsaKernel};

/// AVX2-accelerated word kernel.
///
/// Uses 256-bit SIMD for bulk operations and scalar fallback for tails.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Kernel;

/// Words per 256-bit register.
#[cfg(target_arch = "x86_64")]
const LANES: usize = 4;

#[cfg(target_arch = "x86_64")]
#[derive(Clone, Copy)]
enum BitOp {
    Xor,
    And,
    AndNot,
    Or,
}

#[cfg(target_arch = "x86_64")]
impl VsaKernel for Avx2Kernel {
    fn isa_level(&self) -> IsaLevel {
        IsaLevel::Avx2
    }

    fn xor_into(&self, acc: &mut [u64], src: &[u64]) {
        self.apply(acc, src, BitOp::Xor);
    }

    fn and_into(&self, acc: &mut [u64], src: &[u64]) {
        self.apply(acc, src, BitOp::And);
    }

    fn and_not_into(&self, acc: &mut [u64], src: &[u64]) {
        self.apply(acc, src, BitOp::AndNot);
    }

    fn or_into(&self, acc: &mut [u64], src: &[u64]) {
        self.apply(acc, src, BitOp::Or);
    }

    fn half_add(&self, row: &mut [u64], carry: &mut [u64]) -> bool {
        debug_assert_eq!(row.len(), carry.len());
        if is_x86_feature_detected!("avx2") {
            // Safety: we've confirmed AVX2 support at runtime.
            unsafe { self.half_step_avx2(row, carry, false) }
        } else {
            super::generic::GenericKernel.half_add(row, carry)
        }
    }

    fn half_sub(&self, row: &mut [u64], borrow: &mut [u64]) -> bool {
        debug_assert_eq!(row.len(), borrow.len());
        if is_x86_feature_detected!("avx2") {
            unsafe { self.half_step_avx2(row, borrow, true) }
        } else {
            super::generic::GenericKernel.half_sub(row, borrow)
        }
    }

    fn popcount(&self, a: &[u64]) -> usize {
        // No native vpopcnt in AVX2; scalar popcnt is already one instruction per word.
        super::generic::GenericKernel.popcount(a)
    }

    fn hamming_distance(&self, a: &[u64], b: &[u64]) -> usize {
        super::generic::GenericKernel.hamming_distance(a, b)
    }
}

#[cfg(target_arch = "x86_64")]
impl Avx2Kernel {
    fn apply(&self, acc: &mut [u64], src: &[u64], op: BitOp) {
        debug_assert_eq!(acc.len(), src.len());
        if is_x86_feature_detected!("avx2") {
            unsafe { self.bitop_avx2(acc, src, op) }
        } else {
            let generic = super::generic::GenericKernel;
            match op {
                BitOp::Xor => generic.xor_into(acc, src),
                BitOp::And => generic.and_into(acc, src),
                BitOp::AndNot => generic.and_not_into(acc, src),
                BitOp::Or => generic.or_into(acc, src),
            }
        }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn bitop_avx2(&self, acc: &mut [u64], src: &[u64], op: BitOp) {
        use std::arch::x86_64::*;

        let len = acc.len();
        let chunks = len / LANES;

        for i in 0..chunks {
            let offset = i * LANES;
            unsafe {
                let va = _mm256_loadu_si256(acc.as_ptr().add(offset) as *const __m256i);
                let vb = _mm256_loadu_si256(src.as_ptr().add(offset) as *const __m256i);
                let result = match op {
                    BitOp::Xor => _mm256_xor_si256(va, vb),
                    BitOp::And => _mm256_and_si256(va, vb),
                    // andnot(x, y) computes !x & y
                    BitOp::AndNot => _mm256_andnot_si256(vb, va),
                    BitOp::Or => _mm256_or_si256(va, vb),
                };
                _mm256_storeu_si256(acc.as_mut_ptr().add(offset) as *mut __m256i, result);
            }
        }

        // Scalar tail
        for i in chunks * LANES..len {
            acc[i] = match op {
                BitOp::Xor => acc[i] ^ src[i],
                BitOp::And => acc[i] & src[i],
                BitOp::AndNot => acc[i] & !src[i],
                BitOp::Or => acc[i] | src[i],
            };
        }
    }

    /// Shared body of `half_add` / `half_sub`: the new carry is
    /// `old_row & carry` when adding and `!old_row & carry` when subtracting.
    #[target_feature(enable = "avx2")]
    unsafe fn half_step_avx2(&self, row: &mut [u64], carry: &mut [u64], subtract: bool) -> bool {
        use std::arch::x86_64::*;

        let len = row.len();
        let chunks = len / LANES;
        let mut remaining;

        unsafe {
            let mut any = _mm256_setzero_si256();
            for i in 0..chunks {
                let offset = i * LANES;
                let vr = _mm256_loadu_si256(row.as_ptr().add(offset) as *const __m256i);
                let vc = _mm256_loadu_si256(carry.as_ptr().add(offset) as *const __m256i);
                let next = if subtract {
                    _mm256_andnot_si256(vr, vc)
                } else {
                    _mm256_and_si256(vr, vc)
                };
                let updated = _mm256_xor_si256(vr, vc);
                _mm256_storeu_si256(row.as_mut_ptr().add(offset) as *mut __m256i, updated);
                _mm256_storeu_si256(carry.as_mut_ptr().add(offset) as *mut __m256i, next);
                any = _mm256_or_si256(any, next);
            }
            remaining = _mm256_testz_si256(any, any) == 0;
        }

        // Scalar tail
        for i in chunks * LANES..len {
            let next = if subtract {
                !row[i] & carry[i]
            } else {
                row[i] & carry[i]
            };
            row[i] ^= carry[i];
            carry[i] = next;
            remaining |= next != 0;
        }
        remaining
    }
}

// Provide a stub for non-x86_64 targets so the module compiles.
#[cfg(not(target_arch = "x86_64"))]
impl VsaKernel for Avx2Kernel {
    fn isa_level(&self) -> IsaLevel {
        IsaLevel::Generic
    }
    fn xor_into(&self, acc: &mut [u64], src: &[u64]) {
        super::generic::GenericKernel.xor_into(acc, src);
    }
    fn and_into(&self, acc: &mut [u64], src: &[u64]) {
        super::generic::GenericKernel.and_into(acc, src);
    }
    fn and_not_into(&self, acc: &mut [u64], src: &[u64]) {
        super::generic::GenericKernel.and_not_into(acc, src);
    }
    fn or_into(&self, acc: &mut [u64], src: &[u64]) {
        super::generic::GenericKernel.or_into(acc, src);
    }
    fn half_add(&self, row: &mut [u64], carry: &mut [u64]) -> bool {
        super::generic::GenericKernel.half_add(row, carry)
    }
    fn half_sub(&self, row: &mut [u64], borrow: &mut [u64]) -> bool {
        super::generic::GenericKernel.half_sub(row, borrow)
    }
    fn popcount(&self, a: &[u64]) -> usize {
        super::generic::GenericKernel.popcount(a)
    }
    fn hamming_distance(&self, a: &[u64], b: &[u64]) -> usize {
        super::generic::GenericKernel.hamming_distance(a, b)
    }
}
