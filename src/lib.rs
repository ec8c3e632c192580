// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # semvec
//!
//! Binary Spatter Code hypervectors for distributional semantic models.
//!
//! ## Architecture
//!
//! - **Vectors** (`vsa::vector`): elemental bit patterns and vote-backed semantic vectors
//! - **Voting** (`vsa::voting`): bit-plane counters with ripple-carry superposition
//! - **Normalization** (`vsa::normalize`): probabilistic and majority-rule vote conclusion
//! - **Permutation** (`vsa::permutation`): 64-bit block rotations for order and binding
//! - **SIMD acceleration** (`simd`): runtime-dispatched AVX2/generic word kernels
//! - **Store** (`vsa::store`): concurrent term registry with parallel overlap search
//!
//! ## Library usage
//!
//! ```no_run
//! use semvec::vsa::ops::VsaOps;
//! use semvec::vsa::encode::encode_term;
//! use semvec::vsa::Dimension;
//!
//! let ops = VsaOps::new(Dimension::DEFAULT);
//! let jazz = encode_term(&ops, "jazz");
//! let rock = encode_term(&ops, "rock");
//!
//! let mut music = ops.zero();
//! music.superpose(&jazz, 2.0, None).unwrap();
//! music.superpose(&rock, 1.0, None).unwrap();
//! music.normalize();
//! assert!(music.measure_overlap(&jazz).unwrap() > music.measure_overlap(&rock).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod simd;
pub mod vsa;
