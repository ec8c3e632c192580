//! Term-to-vector encoding.
//!
//! Maps terms into binary vector space using deterministic seeded random
//! generation, so the same term always maps to the same elemental vector.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;

use crate::error::{VsaError, VsaResult};

use super::BinaryVector;
use super::ops::VsaOps;

/// Seed for a term's elemental vector.
pub fn term_seed(term: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    term.hash(&mut hasher);
    hasher.finish()
}

/// Encode a term into a balanced elemental vector.
///
/// The same term always produces the same vector for a given dimension.
pub fn encode_term(ops: &VsaOps, term: &str) -> BinaryVector {
    let mut rng = rand::rngs::StdRng::seed_from_u64(term_seed(term));
    ops.random(&mut rng)
}

/// Encode a role-filler pair: `bind(role, filler)`.
///
/// "color" ⊗ "blue" represents "the color is blue".
pub fn encode_role_filler(ops: &VsaOps, role: &str, filler: &str) -> VsaResult<BinaryVector> {
    ops.bind(&encode_term(ops, role), &encode_term(ops, filler))
}

/// Encode an ordered sequence of terms.
///
/// Each term is superposed with its blocks rotated by its distance from the
/// end of the sequence, then the result is normalized with the configured
/// strategy. `[A, B, C]` becomes `norm(shift(A, 2) + shift(B, 1) + C)`.
pub fn encode_sequence(ops: &VsaOps, terms: &[&str]) -> VsaResult<BinaryVector> {
    if terms.is_empty() {
        return Err(VsaError::EmptyBundle);
    }
    let n = terms.len();
    let mut out = ops.zero();
    for (i, term) in terms.iter().enumerate() {
        let shift = (n - 1 - i) as i64;
        let permutation = ops.shift_permutation(shift);
        out.superpose(&encode_term(ops, term), 1.0, Some(&permutation))?;
    }
    ops.normalize(&mut out);
    Ok(out)
}

/// Encode a whitespace-separated label as the unordered bundle of its words.
///
/// Single-word labels encode to the word's own vector.
pub fn encode_label(ops: &VsaOps, label: &str) -> VsaResult<BinaryVector> {
    let words: Vec<&str> = label.split_whitespace().collect();
    match words.as_slice() {
        [] => Err(VsaError::EmptyBundle),
        [word] => Ok(encode_term(ops, word)),
        _ => {
            let vectors: Vec<BinaryVector> = words.iter().map(|w| encode_term(ops, w)).collect();
            let weighted: Vec<(&BinaryVector, f64)> = vectors.iter().map(|v| (v, 1.0)).collect();
            ops.bundle(&weighted)
        }
    }
}
