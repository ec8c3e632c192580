//! Binary Spatter Code vector core.
//!
//! This module implements hyperdimensional computing over dense binary
//! vectors whose dimension is a multiple of 64. It provides:
//!
//! - [`BinaryVector`] — elemental or semantic (vote-backed) binary vectors
//! - [`voting::VotingRecord`] — the bit-plane counter store behind superposition
//! - [`normalize`] — probabilistic and majority-rule vote conclusion
//! - [`permutation`] — 64-bit block permutations and their inverses
//! - [`VsaOps`](ops::VsaOps) — factory and functional facade driven by [`VsaConfig`](crate::config::VsaConfig)
//! - Term encoding and an in-memory vector store with parallel search

pub mod encode;
pub mod io;
pub mod normalize;
pub mod ops;
pub mod permutation;
pub mod store;
pub mod vector;
pub mod voting;

use serde::{Deserialize, Serialize};

use crate::error::{VsaError, VsaResult};

pub use vector::BinaryVector;

/// Bits per permutation block.
pub const BLOCK_BITS: usize = 64;

/// Binary vector dimensionality, always a positive multiple of 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Dimension(usize);

impl Dimension {
    /// Standard high-capacity dimension (the smallest multiple of 64 above 10,000).
    pub const DEFAULT: Self = Self(10_048);

    /// Smaller dimension for fast testing.
    pub const TEST: Self = Self(1_024);

    /// Validate and wrap a dimension.
    pub fn new(bits: usize) -> VsaResult<Self> {
        if bits == 0 || bits % BLOCK_BITS != 0 {
            return Err(VsaError::InvalidDimension { dimension: bits });
        }
        Ok(Self(bits))
    }

    /// Number of components (bits).
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of 64-bit words (equivalently, permutation blocks).
    pub fn words(self) -> usize {
        self.0 / BLOCK_BITS
    }

    /// Number of bytes in the dense stream form.
    pub fn byte_len(self) -> usize {
        self.words() * 8
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Dimension {
    type Error = VsaError;

    fn try_from(bits: usize) -> VsaResult<Self> {
        Self::new(bits)
    }
}

impl From<Dimension> for usize {
    fn from(dim: Dimension) -> usize {
        dim.0
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a vector still is a single bit pattern or carries a voting record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorMode {
    /// A single dense bit vector with no vote history.
    Elemental,
    /// Backed by a voting record accumulated through superposition.
    Semantic,
}

impl std::fmt::Display for VectorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorMode::Elemental => write!(f, "Elemental"),
            VectorMode::Semantic => write!(f, "Semantic"),
        }
    }
}

/// How `bind` / `release` combine two vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMode {
    /// Plain XOR; bind and release are the same operation.
    #[default]
    Xor,
    /// Shift-permute then XOR (`bind(A, B) = shift(A, +1) ^ B`), with the
    /// directed right inverse used for release.
    Permute,
}

impl std::fmt::Display for BindingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingMode::Xor => write!(f, "xor"),
            BindingMode::Permute => write!(f, "permute"),
        }
    }
}

/// How a voting record is collapsed back into a bit vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Near-tie dimensions are drawn in proportion to their Gaussian tail probability.
    #[default]
    Probabilistic,
    /// Classical Binary Spatter Code majority rule.
    Majority,
}

impl std::fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationMode::Probabilistic => write!(f, "probabilistic"),
            NormalizationMode::Majority => write!(f, "majority"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_word_lengths() {
        assert_eq!(Dimension::new(64).unwrap().words(), 1);
        assert_eq!(Dimension::new(512).unwrap().words(), 8);
        assert_eq!(Dimension::DEFAULT.words(), 157);
        assert_eq!(Dimension::TEST.byte_len(), 128);
    }

    #[test]
    fn dimension_must_be_multiple_of_64() {
        assert!(matches!(
            Dimension::new(100),
            Err(VsaError::InvalidDimension { dimension: 100 })
        ));
        assert!(Dimension::new(0).is_err());
        assert!(Dimension::new(10_000).is_err());
    }

    #[test]
    fn dimension_serde_validates() {
        let dim: Dimension = serde_json::from_str("128").unwrap();
        assert_eq!(dim.get(), 128);
        assert!(serde_json::from_str::<Dimension>("100").is_err());
    }

    #[test]
    fn modes_parse_lowercase() {
        let mode: BindingMode = serde_json::from_str("\"permute\"").unwrap();
        assert_eq!(mode, BindingMode::Permute);
        let norm: NormalizationMode = serde_json::from_str("\"majority\"").unwrap();
        assert_eq!(norm, NormalizationMode::Majority);
    }
}
