//! Pure-Rust scalar fallback for word kernel operations.
//!
//! This implementation works on all platforms and serves as the reference
//! implementation for correctness testing.

use super::{IsaLevel, VsaKernel};

/// Pure-Rust scalar kernel — no SIMD intrinsics.
#[derive(Debug, Clone, Copy)]
pub struct GenericKernel;

impl VsaKernel for GenericKernel {
    fn isa_level(&self) -> IsaLevel {
        IsaLevel::Generic
    }

    fn xor_into(&self, acc: &mut [u64], src: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        for (a, &s) in acc.iter_mut().zip(src.iter()) {
            *a ^= s;
        }
    }

    fn and_into(&self, acc: &mut [u64], src: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        for (a, &s) in acc.iter_mut().zip(src.iter()) {
            *a &= s;
        }
    }

    fn and_not_into(&self, acc: &mut [u64], src: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        for (a, &s) in acc.iter_mut().zip(src.iter()) {
            *a &= !s;
        }
    }

    fn or_into(&self, acc: &mut [u64], src: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        for (a, &s) in acc.iter_mut().zip(src.iter()) {
            *a |= s;
        }
    }

    fn half_add(&self, row: &mut [u64], carry: &mut [u64]) -> bool {
        debug_assert_eq!(row.len(), carry.len());
        let mut any = 0u64;
        for (r, c) in row.iter_mut().zip(carry.iter_mut()) {
            let overflow = *r & *c;
            *r ^= *c;
            *c = overflow;
            any |= overflow;
        }
        any != 0
    }

    fn half_sub(&self, row: &mut [u64], borrow: &mut [u64]) -> bool {
        debug_assert_eq!(row.len(), borrow.len());
        let mut any = 0u64;
        for (r, b) in row.iter_mut().zip(borrow.iter_mut()) {
            let underflow = !*r & *b;
            *r ^= *b;
            *b = underflow;
            any |= underflow;
        }
        any != 0
    }

    fn popcount(&self, a: &[u64]) -> usize {
        a.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn hamming_distance(&self, a: &[u64], b: &[u64]) -> usize {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&av, &bv)| (av ^ bv).count_ones() as usize)
            .sum()
    }
}
