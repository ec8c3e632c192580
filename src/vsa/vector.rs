//! Binary vectors: elemental bit patterns and vote-backed semantic vectors.
//!
//! An elemental vector is just `dimension` bits. The first weighted
//! superposition turns it into a semantic vector: its bits become the first
//! row of a [`VotingRecord`], and further superpositions only update the
//! record. The dense bits are refreshed when the votes are concluded by
//! [`BinaryVector::normalize`], [`BinaryVector::normalize_bsc`] or
//! [`BinaryVector::tally_votes`]; read-only operations on a vector with
//! pending votes see its majority-rule tally.

use std::borrow::Cow;

use rand::Rng;

use crate::error::{VsaError, VsaResult};
use crate::simd;

use super::normalize;
use super::permutation;
use super::voting::VotingRecord;
use super::{BindingMode, Dimension, NormalizationMode, VectorMode};

/// Number of leading dimensions shown by the `Display` dump.
const DEBUG_PRINT_LENGTH: usize = 64;

/// Per-vector algebra settings, normally taken from [`VsaConfig`](crate::config::VsaConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorOptions {
    /// How `bind` / `release` combine vectors.
    pub binding: BindingMode,
    /// Decimal places kept when the first superposed weight is fractional.
    pub fractional_decimal_places: u32,
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            binding: BindingMode::Xor,
            fractional_decimal_places: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VectorState {
    Elemental,
    Semantic(VotingRecord),
}

/// A binary hypervector of a fixed dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryVector {
    dim: Dimension,
    /// Dense bits; for semantic vectors, a cache refreshed on conclusion.
    bits: Vec<u64>,
    state: VectorState,
    options: VectorOptions,
}

impl BinaryVector {
    /// Create an all-zero elemental vector.
    pub fn zero(dim: Dimension) -> Self {
        Self {
            dim,
            bits: vec![0; dim.words()],
            state: VectorState::Elemental,
            options: VectorOptions::default(),
        }
    }

    /// Create an elemental vector from its 64-bit words.
    pub fn from_words(dim: Dimension, words: Vec<u64>) -> VsaResult<Self> {
        if words.len() != dim.words() {
            return Err(VsaError::DimensionMismatch {
                expected: dim.get(),
                actual: words.len() * 64,
            });
        }
        Ok(Self {
            dim,
            bits: words,
            state: VectorState::Elemental,
            options: VectorOptions::default(),
        })
    }

    /// Create a random elemental vector with exactly `dimension / 2` ones.
    pub fn random(dim: Dimension, rng: &mut impl Rng) -> Self {
        Self::random_with_seed_length(dim, dim.get() / 2, rng)
    }

    /// Create a random elemental vector with `seed_length` ones.
    ///
    /// Binary vectors must be balanced between ones and zeros, so any other
    /// `seed_length` is replaced by `dimension / 2` with a warning.
    pub fn random_with_seed_length(dim: Dimension, seed_length: usize, rng: &mut impl Rng) -> Self {
        let balanced = dim.get() / 2;
        if seed_length != balanced {
            tracing::warn!(
                requested = seed_length,
                corrected = balanced,
                dimension = dim.get(),
                "unbalanced seed length for a binary vector; using dimension/2"
            );
        }
        let mut vector = Self::zero(dim);
        for index in rand::seq::index::sample(rng, dim.get(), balanced) {
            vector.bits[index / 64] |= 1 << (index % 64);
        }
        vector
    }

    /// Replace the algebra settings.
    pub fn with_options(mut self, options: VectorOptions) -> Self {
        self.options = options;
        self
    }

    /// The algebra settings of this vector.
    pub fn options(&self) -> VectorOptions {
        self.options
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn mode(&self) -> VectorMode {
        match self.state {
            VectorState::Elemental => VectorMode::Elemental,
            VectorState::Semantic(_) => VectorMode::Semantic,
        }
    }

    /// The current dense words.
    ///
    /// For a semantic vector with pending votes this is the cache from the
    /// last conclusion; use [`dense_words`](Self::dense_words) for the
    /// up-to-date tally.
    pub fn words(&self) -> &[u64] {
        &self.bits
    }

    /// The dense words with any pending votes tallied by majority rule.
    pub fn dense_words(&self) -> Cow<'_, [u64]> {
        match &self.state {
            VectorState::Semantic(record) if record.is_stale() => {
                Cow::Owned(normalize::conclude_majority(record))
            }
            _ => Cow::Borrowed(&self.bits),
        }
    }

    /// Bit `index` of the current dense words.
    pub fn get_bit(&self, index: usize) -> bool {
        debug_assert!(index < self.dim.get());
        (self.bits[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Whether the vector carries no information.
    ///
    /// Elemental vectors are zero when no bit is set; semantic vectors when
    /// no dimension has received a count.
    pub fn is_zero(&self) -> bool {
        match &self.state {
            VectorState::Elemental => self.bits.iter().all(|&w| w == 0),
            VectorState::Semantic(record) => record.is_empty(),
        }
    }

    /// The voting record, if this vector is semantic.
    pub fn voting_record(&self) -> Option<&VotingRecord> {
        match &self.state {
            VectorState::Elemental => None,
            VectorState::Semantic(record) => Some(record),
        }
    }

    /// Rows in the voting record (0 for elemental vectors).
    pub fn row_count(&self) -> usize {
        self.voting_record().map_or(0, VotingRecord::row_count)
    }

    /// Total votes cast into this vector (0 for elemental vectors).
    pub fn total_votes(&self) -> u64 {
        self.voting_record().map_or(0, VotingRecord::total_votes)
    }

    /// Floor folded out of every counter (0 for elemental vectors).
    pub fn minimum(&self) -> u64 {
        self.voting_record().map_or(0, VotingRecord::minimum)
    }

    /// Weight precision fixed by the first superposition (0 for elemental vectors).
    pub fn decimal_places(&self) -> u32 {
        self.voting_record().map_or(0, VotingRecord::decimal_places)
    }

    /// The highest count shared by every dimension of the voting record.
    pub fn maximum_shared_weight(&self) -> u64 {
        self.voting_record()
            .map_or(0, VotingRecord::maximum_shared_weight)
    }

    fn check_dimension(&self, other: &BinaryVector) -> VsaResult<()> {
        if self.dim != other.dim {
            return Err(VsaError::DimensionMismatch {
                expected: self.dim.get(),
                actual: other.dim.get(),
            });
        }
        Ok(())
    }

    /// Start a voting record seeded with the current bits.
    ///
    /// Superposition does this automatically; calling it on a vector that is
    /// already semantic only logs a warning.
    pub fn elemental_to_semantic(&mut self) {
        if self.mode() == VectorMode::Semantic {
            tracing::warn!("elemental_to_semantic called on a semantic vector; nothing to do");
            return;
        }
        self.ensure_semantic(0);
    }

    fn ensure_semantic(&mut self, decimal_places: u32) -> &mut VotingRecord {
        if let VectorState::Elemental = self.state {
            self.state = VectorState::Semantic(VotingRecord::seeded(&self.bits, decimal_places));
        }
        match &mut self.state {
            VectorState::Semantic(record) => record,
            VectorState::Elemental => unreachable!("state was just made semantic"),
        }
    }

    /// Add `other` into this vector's votes with the given weight.
    ///
    /// If `permutation` is given, `other`'s blocks are permuted before being
    /// counted; `other` itself is not modified. A zero weight, a weight that
    /// rounds to zero at this vector's precision, or a zero `other` changes
    /// nothing. A negative weight is ignored with a warning.
    ///
    /// The first effective superposition makes the vector semantic and fixes
    /// its weight precision: fractional weights keep
    /// [`VectorOptions::fractional_decimal_places`] digits from then on.
    pub fn superpose(
        &mut self,
        other: &BinaryVector,
        weight: f64,
        permutation: Option<&[usize]>,
    ) -> VsaResult<()> {
        self.check_dimension(other)?;
        if let Some(p) = permutation {
            permutation::validate(self.dim, p)?;
        }
        if weight == 0.0 || other.is_zero() {
            return Ok(());
        }
        if !weight.is_finite() {
            tracing::warn!(weight, "ignoring non-finite superposition weight");
            return Ok(());
        }
        if weight < 0.0 {
            tracing::warn!(weight, "ignoring negative superposition weight");
            return Ok(());
        }

        let decimal_places = match &self.state {
            VectorState::Semantic(record) => record.decimal_places(),
            VectorState::Elemental if weight.fract() != 0.0 => {
                self.options.fractional_decimal_places
            }
            VectorState::Elemental => 0,
        };
        let scaled = (weight * 10f64.powi(decimal_places as i32)).round();
        if scaled == 0.0 {
            return Ok(());
        }

        let mut pattern = other.dense_words().into_owned();
        if let Some(p) = permutation {
            permutation::apply(&mut pattern, p);
        }

        let record = self.ensure_semantic(decimal_places);
        record.add_votes(&pattern, scaled as u64);
        Ok(())
    }

    /// Bind `other` into this vector.
    ///
    /// XOR under [`BindingMode::Xor`]; under [`BindingMode::Permute`] this is
    /// [`bind_directed`](Self::bind_directed) with direction `+1`.
    pub fn bind(&mut self, other: &BinaryVector) -> VsaResult<()> {
        match self.options.binding {
            BindingMode::Xor => self.xor_with(other),
            BindingMode::Permute => self.bind_directed(other, 1),
        }
    }

    /// Inverse of [`bind`](Self::bind).
    ///
    /// Identical to `bind` under [`BindingMode::Xor`]; under
    /// [`BindingMode::Permute`] this is `bind_directed(other, -1)`.
    pub fn release(&mut self, other: &BinaryVector) -> VsaResult<()> {
        match self.options.binding {
            BindingMode::Xor => self.xor_with(other),
            BindingMode::Permute => self.bind_directed(other, -1),
        }
    }

    /// Permutation-augmented binding.
    ///
    /// With `direction > 0`: `self = shift(self, +1) XOR other`. Applied as
    /// `shift(A, +1) XOR C` it also recovers `B` from `C = bind(A, B)` (the
    /// left inverse).
    ///
    /// With `direction <= 0`: `self = shift(self XOR other, -1)`, which
    /// recovers `A` from `C = bind(A, B)` given `B` (the right inverse).
    pub fn bind_directed(&mut self, other: &BinaryVector, direction: i32) -> VsaResult<()> {
        self.check_dimension(other)?;
        self.settle();
        let kernel = simd::kernel();
        let key = other.dense_words();
        if direction > 0 {
            permutation::apply(&mut self.bits, &permutation::shift_permutation(self.dim, 1));
            kernel.xor_into(&mut self.bits, &key);
        } else {
            kernel.xor_into(&mut self.bits, &key);
            permutation::apply(&mut self.bits, &permutation::shift_permutation(self.dim, -1));
        }
        self.sync_record();
        Ok(())
    }

    /// Directed release: plain XOR under [`BindingMode::Xor`], otherwise
    /// [`bind_directed`](Self::bind_directed) in the given direction.
    pub fn release_directed(&mut self, other: &BinaryVector, direction: i32) -> VsaResult<()> {
        match self.options.binding {
            BindingMode::Xor => self.xor_with(other),
            BindingMode::Permute => self.bind_directed(other, direction),
        }
    }

    fn xor_with(&mut self, other: &BinaryVector) -> VsaResult<()> {
        self.check_dimension(other)?;
        self.settle();
        simd::kernel().xor_into(&mut self.bits, &other.dense_words());
        self.sync_record();
        Ok(())
    }

    /// Permute this vector's 64-bit blocks: `new_block[i] = old_block[permutation[i]]`.
    ///
    /// Pending votes are permuted along with the bits.
    pub fn permute(&mut self, permutation: &[usize]) -> VsaResult<()> {
        permutation::validate(self.dim, permutation)?;
        permutation::apply(&mut self.bits, permutation);
        if let VectorState::Semantic(record) = &mut self.state {
            record.permute(permutation);
        }
        Ok(())
    }

    /// Conclude any pending votes by majority rule and collapse the record,
    /// so that the dense bits are authoritative before they are rewritten.
    fn settle(&mut self) {
        if let VectorState::Semantic(record) = &mut self.state {
            if record.is_stale() || record.row_count() > 1 || record.minimum() > 0 {
                tracing::debug!("concluding pending votes before a dense operation");
                self.bits = normalize::conclude_majority(record);
                record.collapse(&self.bits);
            }
        }
    }

    /// Re-seed the voting record from the (rewritten) dense bits.
    fn sync_record(&mut self) {
        if let VectorState::Semantic(record) = &mut self.state {
            record.collapse(&self.bits);
        }
    }

    /// Probabilistic normalization.
    ///
    /// Elemental vectors are left unchanged, and a single-row record yields
    /// that row. Otherwise each dimension is set with the probability
    /// returned by [`normalize::vote_probability`] for its count, using a
    /// generator seeded from the record's content, and the record collapses
    /// to a single row equal to the result.
    pub fn normalize(&mut self) {
        let VectorState::Semantic(record) = &mut self.state else {
            return;
        };
        if record.row_count() == 1 {
            self.bits = record.rows()[0].clone();
            record.mark_fresh();
            return;
        }
        self.bits = normalize::conclude_probabilistic(record);
        record.collapse(&self.bits);
    }

    /// Majority-rule normalization in the manner of the classical Binary Spatter Code.
    ///
    /// Ties on an even vote total alternate in index order (see
    /// [`normalize::conclude_majority`]). Elemental vectors are left unchanged.
    pub fn normalize_bsc(&mut self) {
        let VectorState::Semantic(record) = &mut self.state else {
            return;
        };
        self.bits = normalize::conclude_majority(record);
        record.collapse(&self.bits);
    }

    /// Normalize with the given strategy.
    pub fn normalize_with(&mut self, mode: NormalizationMode) {
        match mode {
            NormalizationMode::Probabilistic => self.normalize(),
            NormalizationMode::Majority => self.normalize_bsc(),
        }
    }

    /// Tally the votes by majority rule into the dense bits, keeping the
    /// voting record so that further superpositions still accumulate.
    pub fn tally_votes(&mut self) {
        if let VectorState::Semantic(record) = &mut self.state {
            self.bits = normalize::conclude_majority(record);
            record.mark_fresh();
        }
    }

    /// Similarity as `1 - hamming / dimension`.
    ///
    /// 1.0 for identical vectors, about 0.5 for unrelated ones, and 0.0 if
    /// either vector is zero.
    pub fn measure_overlap(&self, other: &BinaryVector) -> VsaResult<f64> {
        self.check_dimension(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(0.0);
        }
        let hamming = simd::kernel().hamming_distance(&self.dense_words(), &other.dense_words());
        Ok(1.0 - hamming as f64 / self.dim.get() as f64)
    }
}

fn push_bits(out: &mut String, words: &[u64], len: usize) {
    for i in 0..len {
        out.push(if (words[i / 64] >> (i % 64)) & 1 == 1 { '1' } else { '0' });
        out.push(' ');
    }
}

impl std::fmt::Display for BinaryVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = DEBUG_PRINT_LENGTH.min(self.dim.get());
        let mut line = String::new();
        match &self.state {
            VectorState::Elemental => {
                push_bits(&mut line, &self.bits, shown);
                writeln!(f, "BinaryVector. Elemental. First {shown} values are:")?;
                writeln!(f, "{}", line.trim_end())?;
            }
            VectorState::Semantic(record) => {
                writeln!(f, "BinaryVector. Semantic. First {shown} values are:")?;
                writeln!(f, "VOTING RECORD:")?;
                for row in record.rows() {
                    line.clear();
                    push_bits(&mut line, row, shown);
                    writeln!(f, "{}", line.trim_end())?;
                }
                let scale = 10u64.pow(record.decimal_places());
                let counts: Vec<String> = (0..shown)
                    .map(|i| (record.count(i) / scale).to_string())
                    .collect();
                writeln!(f, "COUNTS    : {}", counts.join(" "))?;
                writeln!(f, "Votes {}", record.total_votes())?;
                writeln!(f, "Minimum {}", record.minimum())?;
            }
        }
        write!(f, "Cardinality {}", simd::kernel().popcount(&self.dense_words()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn dim(bits: usize) -> Dimension {
        Dimension::new(bits).unwrap()
    }

    fn seeded_rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    #[test]
    fn zero_vector_is_elemental_and_zero() {
        let v = BinaryVector::zero(dim(128));
        assert_eq!(v.mode(), VectorMode::Elemental);
        assert!(v.is_zero());
        assert_eq!(v.row_count(), 0);
    }

    #[test]
    fn random_vectors_are_balanced() {
        let mut rng = seeded_rng();
        for bits in [64, 512, 1024, 10_048] {
            let v = BinaryVector::random(dim(bits), &mut rng);
            assert_eq!(simd::kernel().popcount(v.words()), bits / 2);
        }
    }

    #[test]
    fn unbalanced_seed_length_is_corrected() {
        let mut rng = seeded_rng();
        let v = BinaryVector::random_with_seed_length(dim(64), 2, &mut rng);
        assert_eq!(simd::kernel().popcount(v.words()), 32);
    }

    #[test]
    fn elemental_to_semantic_adds_one_row() {
        let mut v = BinaryVector::zero(dim(64));
        assert_eq!(v.row_count(), 0);
        v.elemental_to_semantic();
        assert_eq!(v.row_count(), 1);
        assert_eq!(v.mode(), VectorMode::Semantic);
        v.elemental_to_semantic();
        assert_eq!(v.row_count(), 1);
    }

    #[test]
    fn zero_weight_and_zero_vector_are_noops() {
        let mut rng = seeded_rng();
        let mut v = BinaryVector::random(dim(128), &mut rng);
        let other = BinaryVector::random(dim(128), &mut rng);
        let before = v.clone();
        v.superpose(&other, 0.0, None).unwrap();
        v.superpose(&BinaryVector::zero(dim(128)), 3.0, None).unwrap();
        assert_eq!(v, before);
        assert_eq!(v.mode(), VectorMode::Elemental);
    }

    #[test]
    fn fractional_first_weight_fixes_precision() {
        let mut rng = seeded_rng();
        let mut v = BinaryVector::zero(dim(128));
        let other = BinaryVector::random(dim(128), &mut rng);
        v.superpose(&other, 0.5, None).unwrap();
        assert_eq!(v.decimal_places(), 2);
        assert_eq!(v.total_votes(), 50);
        v.superpose(&other, 1.234, None).unwrap();
        assert_eq!(v.total_votes(), 50 + 123);
    }

    #[test]
    fn integral_first_weight_keeps_integer_precision() {
        let mut rng = seeded_rng();
        let mut v = BinaryVector::zero(dim(128));
        let other = BinaryVector::random(dim(128), &mut rng);
        v.superpose(&other, 2.0, None).unwrap();
        v.superpose(&other, 1.4, None).unwrap();
        assert_eq!(v.decimal_places(), 0);
        assert_eq!(v.total_votes(), 3);
    }

    #[test]
    fn superpose_rejects_mismatched_operands() {
        let mut v = BinaryVector::zero(dim(128));
        let other = BinaryVector::zero(dim(256));
        assert!(matches!(
            v.superpose(&other, 1.0, None),
            Err(VsaError::DimensionMismatch {
                expected: 128,
                actual: 256
            })
        ));

        let same = BinaryVector::zero(dim(128));
        assert!(matches!(
            v.superpose(&same, 1.0, Some(&[0, 1, 2])),
            Err(VsaError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(v.mode(), VectorMode::Elemental);
    }

    #[test]
    fn superposed_permutation_leaves_source_untouched() {
        let d = dim(512);
        let mut rng = seeded_rng();
        let elemental = BinaryVector::random(d, &mut rng);
        let original = elemental.clone();
        let shift = permutation::shift_permutation(d, 1);

        let mut semantic = BinaryVector::zero(d);
        semantic.superpose(&elemental, 1.0, Some(&shift)).unwrap();
        semantic.normalize();
        assert_eq!(elemental, original);

        let mut permuted = elemental.clone();
        permuted.permute(&shift).unwrap();
        assert_eq!(semantic.words(), permuted.words());
        assert_ne!(permuted.words(), original.words());

        permuted
            .permute(&permutation::inverse_permutation(&shift))
            .unwrap();
        assert_eq!(permuted.words(), original.words());
    }

    #[test]
    fn negative_weight_is_ignored() {
        let d = dim(64);
        let pattern = BinaryVector::from_words(d, vec![0x0000_FFFF_0000_FFFF]).unwrap();

        let mut elemental = BinaryVector::zero(d);
        elemental.superpose(&pattern, -2.0, None).unwrap();
        assert_eq!(elemental.mode(), VectorMode::Elemental);
        assert!(elemental.is_zero());

        let mut v = BinaryVector::zero(d);
        v.superpose(&pattern, 3.0, None).unwrap();
        let before = v.clone();
        v.superpose(&pattern, -5.0, None).unwrap();
        assert_eq!(v.total_votes(), 3);
        assert_eq!(v, before);
        v.normalize_bsc();
        assert_eq!(v.words(), &[0x0000_FFFF_0000_FFFF]);
    }

    #[test]
    fn word_count_mismatch_reports_bits() {
        assert!(matches!(
            BinaryVector::from_words(dim(128), vec![1]),
            Err(VsaError::DimensionMismatch {
                expected: 128,
                actual: 64
            })
        ));
    }

    #[test]
    fn normalize_is_noop_for_elemental() {
        let mut rng = seeded_rng();
        let mut v = BinaryVector::random(dim(256), &mut rng);
        let before = v.clone();
        v.normalize();
        v.normalize_bsc();
        assert_eq!(v, before);
    }

    #[test]
    fn normalize_collapses_record() {
        let mut rng = seeded_rng();
        let d = dim(256);
        let mut v = BinaryVector::zero(d);
        for _ in 0..5 {
            v.superpose(&BinaryVector::random(d, &mut rng), 1.0, None)
                .unwrap();
        }
        assert!(v.row_count() > 1);
        v.normalize();
        assert_eq!(v.row_count(), 1);
        assert_eq!(v.total_votes(), 1);
        assert_eq!(v.minimum(), 0);
        let once = v.words().to_vec();
        v.normalize();
        assert_eq!(v.words(), once.as_slice());
    }

    #[test]
    fn normalize_is_reproducible() {
        let mut rng = seeded_rng();
        let d = dim(1024);
        let a = BinaryVector::random(d, &mut rng);
        let b = BinaryVector::random(d, &mut rng);
        let mut first = BinaryVector::zero(d);
        first.superpose(&a, 3.0, None).unwrap();
        first.superpose(&b, 2.0, None).unwrap();
        let mut second = first.clone();
        first.normalize();
        second.normalize();
        assert_eq!(first.words(), second.words());
    }

    #[test]
    fn tally_keeps_votes_accumulating() {
        let d = dim(64);
        let a = BinaryVector::from_words(d, vec![0xFF]).unwrap();
        let b = BinaryVector::from_words(d, vec![0xFF00]).unwrap();
        let mut v = BinaryVector::zero(d);
        v.superpose(&a, 3.0, None).unwrap();
        v.tally_votes();
        assert_eq!(v.words(), &[0xFF]);
        v.superpose(&b, 5.0, None).unwrap();
        assert_eq!(v.total_votes(), 8);
        v.tally_votes();
        assert_eq!(v.words(), &[0xFF00]);
    }

    #[test]
    fn xor_bind_is_self_inverse() {
        let mut rng = seeded_rng();
        let d = dim(1024);
        let a = BinaryVector::random(d, &mut rng);
        let b = BinaryVector::random(d, &mut rng);
        let mut c = a.clone();
        c.bind(&b).unwrap();
        assert!((c.measure_overlap(&a).unwrap() - 0.5).abs() < 0.1);
        c.release(&b).unwrap();
        assert_eq!(c.words(), a.words());
    }

    #[test]
    fn directed_binding_inverses() {
        let mut rng = seeded_rng();
        let d = dim(512);
        let options = VectorOptions {
            binding: BindingMode::Permute,
            ..Default::default()
        };
        let a = BinaryVector::random(d, &mut rng).with_options(options);
        let b = BinaryVector::random(d, &mut rng).with_options(options);

        let mut c = a.clone();
        c.bind_directed(&b, 1).unwrap();

        // Left inverse: shift(A, +1) XOR C recovers B.
        let mut left = a.clone();
        left.bind_directed(&c, 1).unwrap();
        assert_eq!(left.words(), b.words());

        // Right inverse: shift(C XOR B, -1) recovers A.
        let mut right = c.clone();
        right.release_directed(&b, -1).unwrap();
        assert_eq!(right.words(), a.words());

        // bind/release use the directed forms.
        let mut round = a.clone();
        round.bind(&b).unwrap();
        assert_eq!(round.words(), c.words());
        round.release(&b).unwrap();
        assert_eq!(round.words(), a.words());
    }

    #[test]
    fn directed_release_is_plain_xor_without_permute_binding() {
        let mut rng = seeded_rng();
        let d = dim(512);
        let a = BinaryVector::random(d, &mut rng);
        let b = BinaryVector::random(d, &mut rng);
        let mut c = a.clone();
        c.bind_directed(&b, 1).unwrap();
        c.release_directed(&b, -1).unwrap();
        let mut shifted = a.clone();
        shifted
            .permute(&permutation::shift_permutation(d, 1))
            .unwrap();
        assert_eq!(c.words(), shifted.words());
    }

    #[test]
    fn binding_a_semantic_vector_concludes_votes_first() {
        let d = dim(64);
        let a = BinaryVector::from_words(d, vec![0xFF]).unwrap();
        let key = BinaryVector::from_words(d, vec![0x0F]).unwrap();
        let mut v = BinaryVector::zero(d);
        v.superpose(&a, 3.0, None).unwrap();
        v.bind(&key).unwrap();
        assert_eq!(v.words(), &[0xF0]);
        assert_eq!(v.row_count(), 1);
    }

    #[test]
    fn permute_moves_pending_votes() {
        let d = dim(128);
        let a = BinaryVector::from_words(d, vec![0xFF, 0]).unwrap();
        let mut v = BinaryVector::zero(d);
        v.superpose(&a, 3.0, None).unwrap();
        v.permute(&[1, 0]).unwrap();
        v.normalize_bsc();
        assert_eq!(v.words(), &[0, 0xFF]);
    }

    #[test]
    fn overlap_properties() {
        let mut rng = seeded_rng();
        let d = dim(1024);
        let a = BinaryVector::random(d, &mut rng);
        let b = BinaryVector::random(d, &mut rng);
        let ab = a.measure_overlap(&b).unwrap();
        assert_eq!(ab, b.measure_overlap(&a).unwrap());
        assert!((0.0..=1.0).contains(&ab));
        assert!((ab - 0.5).abs() < 0.1, "random overlap {ab}");
        assert_eq!(a.measure_overlap(&a).unwrap(), 1.0);

        let zero = BinaryVector::zero(d);
        assert_eq!(zero.measure_overlap(&a).unwrap(), 0.0);
        assert_eq!(a.measure_overlap(&zero).unwrap(), 0.0);
    }

    #[test]
    fn overlap_rejects_mismatched_dimensions() {
        let a = BinaryVector::zero(dim(64));
        let b = BinaryVector::zero(dim(128));
        assert!(matches!(
            a.measure_overlap(&b),
            Err(VsaError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn display_reports_mode() {
        let mut v = BinaryVector::zero(dim(64));
        assert!(v.to_string().contains("Elemental"));
        let other = BinaryVector::from_words(dim(64), vec![0b1011]).unwrap();
        v.superpose(&other, 2.0, None).unwrap();
        let dump = v.to_string();
        assert!(dump.contains("Semantic"));
        assert!(dump.contains("Votes 2"));
        assert!(dump.contains("COUNTS    : 2 2 0 2"));
    }
}
