//! Block permutations for binary vectors.
//!
//! Binary vectors are permuted 64 bits at a time: a permutation over a
//! vector of dimension `d` is an array of `d / 64` block indices, and
//! applying it sets `new_block[i] = old_block[permutation[i]]`. Shifting
//! blocks rather than bits is what encodes order and position cheaply.

use crate::error::{VsaError, VsaResult};

use super::Dimension;

/// Build the permutation that rotates blocks by `shift` positions.
///
/// Entry `i` is `(i + shift) mod blocks`, so the shift wraps for negative
/// and out-of-range values: over 6 blocks, shifts of 2, -4 and 14 are the
/// same permutation.
pub fn shift_permutation(dim: Dimension, shift: i64) -> Vec<usize> {
    let blocks = dim.words();
    let offset = shift.rem_euclid(blocks as i64) as usize;
    (0..blocks).map(|i| (i + offset) % blocks).collect()
}

/// Invert a permutation: `inverse[permutation[i]] = i`.
///
/// Callers are expected to pass a valid permutation; see [`validate`].
pub fn inverse_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; permutation.len()];
    for (i, &p) in permutation.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}

/// Check that `permutation` has one entry per block and names every block once.
pub fn validate(dim: Dimension, permutation: &[usize]) -> VsaResult<()> {
    let blocks = dim.words();
    if permutation.len() != blocks {
        return Err(VsaError::DimensionMismatch {
            expected: blocks,
            actual: permutation.len(),
        });
    }
    let mut seen = vec![false; blocks];
    for &p in permutation {
        if p >= blocks {
            return Err(VsaError::InvalidPermutation {
                message: format!("block index {p} out of range for {blocks} blocks"),
            });
        }
        if std::mem::replace(&mut seen[p], true) {
            return Err(VsaError::InvalidPermutation {
                message: format!("block index {p} appears more than once"),
            });
        }
    }
    Ok(())
}

/// Rearrange `words` in place according to a validated permutation.
pub(crate) fn apply(words: &mut [u64], permutation: &[usize]) {
    debug_assert_eq!(words.len(), permutation.len());
    let permuted = permuted(words, permutation);
    words.copy_from_slice(&permuted);
}

/// Return a permuted copy of `words`.
pub(crate) fn permuted(words: &[u64], permutation: &[usize]) -> Vec<u64> {
    permutation.iter().map(|&source| words[source]).collect()
}
