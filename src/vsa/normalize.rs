//! Vote conclusion: collapsing a voting record back into a bit vector.
//!
//! Two strategies are provided:
//!
//! - [`conclude_majority`] — the classical Binary Spatter Code rule: a
//!   dimension is 1 when it received more than half of the votes.
//! - [`conclude_probabilistic`] — each dimension is 1 with the probability
//!   that a fair binomial vote would fall at or below its count, so a
//!   dimension that narrowly won its vote is only narrowly likely to be 1.
//!   Superposing "jazz", "jazz" and "rock" then yields a vector similar to
//!   both terms in proportion to their weights, instead of a copy of "jazz".

use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;

use rand::{Rng, SeedableRng};

use super::voting::VotingRecord;

// Abramowitz & Stegun 7.1.27 coefficients.
const A1: f64 = 0.278393;
const A2: f64 = 0.230389;
const A3: f64 = 0.000972;
const A4: f64 = 0.078108;

/// Error function approximation (Abramowitz & Stegun 7.1.27).
///
/// Absolute error is at most 5·10⁻⁴. Odd: `erf(-z) == -erf(z)`.
pub fn erf(z: f64) -> f64 {
    let x = z.abs();
    let sum = 1.0 + A1 * x + A2 * x.powi(2) + A3 * x.powi(3) + A4 * x.powi(4);
    let magnitude = 1.0 - 1.0 / sum.powi(4);
    if z < 0.0 { -magnitude } else { magnitude }
}

/// Probability that a dimension holding `votes` out of `total` should be 1.
///
/// The count is compared to a Normal approximation of a fair vote with mean
/// `total / 2` and standard deviation `sqrt(total) / 2`.
pub fn vote_probability(votes: f64, total: f64) -> f64 {
    let std_dev = total.sqrt() / 2.0;
    if std_dev == 0.0 {
        return if votes > 0.0 { 1.0 } else { 0.0 };
    }
    let z = (votes - total / 2.0) / std_dev;
    (1.0 + erf(z / SQRT_2)) / 2.0
}

/// Probabilistic conclusion of a voting record.
///
/// Dimensions are visited grouped by encoded count (ascending), then by
/// index. Each draws one uniform value from a generator seeded with
/// [`VotingRecord::superposition_seed`], so the result is a pure function of
/// the record's content.
pub fn conclude_probabilistic(record: &VotingRecord) -> Vec<u64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(record.superposition_seed());
    let total = record.total_votes() as f64;
    let values: BTreeSet<u64> = record.counts().into_iter().collect();

    let mut bits = vec![0u64; record.words()];
    for value in values {
        let probability = vote_probability((value + record.minimum()) as f64, total);
        let matches = record.exact_matches(value);
        for (w, &word) in matches.iter().enumerate() {
            let mut pending = word;
            while pending != 0 {
                let bit = pending.trailing_zeros();
                if rng.gen_range(0.0..1.0) <= probability {
                    bits[w] |= 1 << bit;
                }
                pending &= pending - 1;
            }
        }
    }

    tracing::debug!(
        rows = record.row_count(),
        total_votes = record.total_votes(),
        minimum = record.minimum(),
        "probabilistic vote concluded"
    );
    bits
}

/// Majority-rule conclusion of a voting record.
///
/// A dimension is 1 when its count exceeds `total_votes / 2`. With an even
/// vote total, dimensions that tied exactly alternate in index order: the
/// first tied dimension becomes 0, the second 1, the third 0, and so on.
pub fn conclude_majority(record: &VotingRecord) -> Vec<u64> {
    let words = record.words();
    if record.row_count() == 1 && (record.total_votes() == 0 || record.is_empty()) {
        // Nothing beyond the seed pattern has been counted.
        return record.rows()[0].clone();
    }

    let total = record.total_votes();
    let half_up = total.div_ceil(2);
    let Some(target) = half_up.checked_sub(record.minimum()) else {
        // Every counter already exceeds half the votes.
        return vec![u64::MAX; words];
    };

    let mut result = record.at_least(target);
    if total % 2 == 0 {
        let mut tied = record.exact_matches(target);
        let mut switcher = true;
        for word in tied.iter_mut() {
            let mut pending = *word;
            while pending != 0 {
                let bit = pending & pending.wrapping_neg();
                switcher = !switcher;
                if switcher {
                    *word &= !bit;
                }
                pending &= pending - 1;
            }
        }
        crate::simd::kernel().and_not_into(&mut result, &tied);
    }

    tracing::debug!(
        rows = record.row_count(),
        total_votes = total,
        minimum = record.minimum(),
        "majority vote concluded"
    );
    result
}
