//! SIMD-accelerated word kernels for binary vector operations.
//!
//! This module provides a `VsaKernel` trait with CPU-specific implementations.
//! At runtime, [`detect_isa`] determines the best available instruction set and
//! [`best_kernel`] returns the fastest implementation for the current CPU.
//! [`kernel`] caches that choice for the whole process.
//!
//! All kernels work on `u64` words: binary vectors and every row of a voting
//! record are stored as `dimension / 64` words, bit `i` living in word `i / 64`
//! at position `i % 64`.
//!
//! # Supported ISA levels
//!
//! - **Generic**: Pure-Rust scalar fallback — works everywhere
//! - **AVX2**: 256-bit SIMD for x86_64 systems with AVX2 support

pub mod avx2;
pub mod generic;

use std::sync::OnceLock;

/// Instruction set architecture level detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsaLevel {
    /// Pure-Rust scalar operations, no SIMD.
    Generic,
    /// x86_64 AVX2 (256-bit vectors).
    Avx2,
}

impl std::fmt::Display for IsaLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IsaLevel::Generic => write!(f, "Generic (scalar)"),
            IsaLevel::Avx2 => write!(f, "AVX2 (256-bit)"),
        }
    }
}

/// Detect the best ISA level available on the current CPU.
pub fn detect_isa() -> IsaLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return IsaLevel::Avx2;
        }
    }
    IsaLevel::Generic
}

/// Trait for SIMD-accelerated word kernels.
///
/// Every binary slice argument must have the same length; implementations
/// only `debug_assert` this.
pub trait VsaKernel: Send + Sync {
    /// The ISA level this kernel targets.
    fn isa_level(&self) -> IsaLevel;

    /// `acc ^= src`, word by word.
    fn xor_into(&self, acc: &mut [u64], src: &[u64]);

    /// `acc &= src`.
    fn and_into(&self, acc: &mut [u64], src: &[u64]);

    /// `acc &= !src`.
    fn and_not_into(&self, acc: &mut [u64], src: &[u64]);

    /// `acc |= src`.
    fn or_into(&self, acc: &mut [u64], src: &[u64]);

    /// One ripple-carry step of a bit-plane counter.
    ///
    /// Adds `carry` into `row` (`row ^= carry`) and leaves in `carry` the
    /// dimensions that overflowed (`old_row & carry`). Returns `true` if any
    /// carry remains to be pushed into the next row.
    fn half_add(&self, row: &mut [u64], carry: &mut [u64]) -> bool;

    /// One borrow step of a bit-plane counter.
    ///
    /// Subtracts `borrow` from `row` and leaves in `borrow` the dimensions
    /// that had to borrow from the next row (`!old_row & borrow`). Returns
    /// `true` if any borrow remains.
    fn half_sub(&self, row: &mut [u64], borrow: &mut [u64]) -> bool;

    /// Number of set bits.
    fn popcount(&self, a: &[u64]) -> usize;

    /// Number of positions where `a` and `b` differ.
    fn hamming_distance(&self, a: &[u64], b: &[u64]) -> usize;
}

/// Return the best available kernel for the current CPU.
pub fn best_kernel() -> Box<dyn VsaKernel> {
    match detect_isa() {
        #[cfg(target_arch = "x86_64")]
        IsaLevel::Avx2 => Box::new(avx2::Avx2Kernel),
        _ => Box::new(generic::GenericKernel),
    }
}

static KERNEL: OnceLock<Box<dyn VsaKernel>> = OnceLock::new();

/// The process-wide kernel, selected on first use.
pub fn kernel() -> &'static dyn VsaKernel {
    KERNEL.get_or_init(best_kernel).as_ref()
}
