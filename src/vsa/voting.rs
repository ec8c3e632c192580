//! Voting record: the bit-plane counter store behind superposition.
//!
//! A voting record is a transposed array of unsigned counters, one per
//! dimension. Row `i` holds bit `i` of every counter, so the count for
//! dimension `d` is `Σ row[i][d] · 2^i + minimum`. Adding a bit pattern to
//! every counter at once is a ripple carry across rows, which the SIMD
//! kernels perform a whole row at a time.
//!
//! Before each addition sweep, the largest power-of-two-aligned floor shared
//! by every counter is subtracted and folded into `minimum`; this keeps the
//! number of rows proportional to the spread of the counts rather than their
//! magnitude.

use crate::simd;

/// Bit-plane counter store with its vote bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingRecord {
    /// `rows[i]` is bit `i` of every counter; never empty.
    rows: Vec<Vec<u64>>,
    /// Floor subtracted from every counter.
    minimum: u64,
    /// Sum of the integer-rounded weights superposed so far.
    total_votes: u64,
    /// Fixed-point precision of the weights (0 or the configured fraction digits).
    decimal_places: u32,
    /// Whether votes arrived since the owning vector's bits were last concluded.
    stale: bool,
}

impl VotingRecord {
    /// Start a record whose single row is `bits`, with no votes counted yet.
    pub(crate) fn seeded(bits: &[u64], decimal_places: u32) -> Self {
        Self {
            rows: vec![bits.to_vec()],
            minimum: 0,
            total_votes: 0,
            decimal_places,
            stale: false,
        }
    }

    /// Number of rows (bits per counter).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The raw bit planes, least significant first.
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    /// Number of 64-bit words per row.
    pub fn words(&self) -> usize {
        self.rows[0].len()
    }

    /// Floor folded out of every counter.
    pub fn minimum(&self) -> u64 {
        self.minimum
    }

    /// Total (scaled) votes cast.
    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    /// Weight precision in decimal places.
    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn mark_fresh(&mut self) {
        self.stale = false;
    }

    /// Whether no dimension has received any count.
    pub fn is_empty(&self) -> bool {
        self.minimum == 0 && self.rows.iter().all(|row| row.iter().all(|&w| w == 0))
    }

    /// Add `pattern` to the counters `votes` times.
    ///
    /// The work is split into power-of-two sweeps: each sweep adds `2^k`
    /// starting at row `k`, for the largest `k` that fits in the remaining
    /// votes and lies below the current row count.
    pub(crate) fn add_votes(&mut self, pattern: &[u64], votes: u64) {
        debug_assert_eq!(pattern.len(), self.words());
        if votes == 0 {
            return;
        }
        self.total_votes = self.total_votes.saturating_add(votes);
        self.stale = true;

        let mut remaining = votes;
        while remaining > 0 {
            let log_floor = (u64::BITS - 1 - remaining.leading_zeros()) as usize;
            let row = log_floor.min(self.rows.len() - 1);
            self.fold_shared_weight();
            self.add_from_row(pattern, row);
            remaining -= 1 << row;
        }
    }

    /// Ripple-carry `pattern · 2^row` into the counters.
    fn add_from_row(&mut self, pattern: &[u64], row: usize) {
        let kernel = simd::kernel();
        let mut carry = pattern.to_vec();
        let mut r = row;
        loop {
            if r == self.rows.len() {
                tracing::trace!(rows = r + 1, "voting record grew");
                self.rows.push(carry);
                return;
            }
            if !kernel.half_add(&mut self.rows[r], &mut carry) {
                return;
            }
            r += 1;
        }
    }

    /// The highest value shared by all dimensions.
    ///
    /// Scanning from the top row down, rows are OR-ed together until every
    /// dimension has a set bit; each time that happens at row `x`, every
    /// counter is known to hold at least another `2^x`. The result is a
    /// lower bound on the smallest counter, and is 0 exactly when some
    /// counter is 0.
    pub fn maximum_shared_weight(&self) -> u64 {
        let kernel = simd::kernel();
        let mut shared = 0u64;
        let mut acc = vec![0u64; self.words()];
        for (x, row) in self.rows.iter().enumerate().rev() {
            kernel.or_into(&mut acc, row);
            if acc.iter().all(|&w| w == u64::MAX) {
                shared += 1 << x;
                acc.fill(0);
            }
        }
        shared
    }

    /// Subtract the maximum shared weight from every counter and raise `minimum`.
    fn fold_shared_weight(&mut self) {
        let shared = self.maximum_shared_weight();
        if shared > 0 {
            tracing::trace!(shared, minimum = self.minimum, "folding shared weight");
            self.decrement(shared);
        }
    }

    /// Subtract `amount` from every counter, adding it to `minimum`.
    ///
    /// `amount` must not exceed the smallest counter.
    pub(crate) fn decrement(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.minimum += amount;
        for row in (0..u64::BITS as usize).rev() {
            if (amount >> row) & 1 == 1 {
                self.subtract_from_row(row);
            }
        }
    }

    /// Borrow-propagating subtraction of `2^row` from every counter.
    fn subtract_from_row(&mut self, row: usize) {
        let kernel = simd::kernel();
        let mut borrow = vec![u64::MAX; self.words()];
        for r in row..self.rows.len() {
            if !kernel.half_sub(&mut self.rows[r], &mut borrow) {
                return;
            }
        }
        debug_assert!(false, "voting record underflow at row {row}");
    }

    /// Mask of the dimensions whose encoded counter (excluding `minimum`) equals `value`.
    pub fn exact_matches(&self, value: u64) -> Vec<u64> {
        let kernel = simd::kernel();
        let words = self.words();
        if self.rows.len() < u64::BITS as usize && value >> self.rows.len() != 0 {
            return vec![0; words];
        }
        let mut mask = vec![u64::MAX; words];
        for (r, row) in self.rows.iter().enumerate() {
            if (value >> r) & 1 == 1 {
                kernel.and_into(&mut mask, row);
            } else {
                kernel.and_not_into(&mut mask, row);
            }
        }
        mask
    }

    /// Mask of the dimensions whose encoded counter is at least `target`.
    ///
    /// Bit-serial comparison from the most significant row down, tracking
    /// which dimensions are already greater and which are still equal.
    pub fn at_least(&self, target: u64) -> Vec<u64> {
        let kernel = simd::kernel();
        let words = self.words();
        let target_bits = (u64::BITS - target.leading_zeros()) as usize;
        let width = self.rows.len().max(target_bits);

        let mut greater = vec![0u64; words];
        let mut equal = vec![u64::MAX; words];
        let mut scratch = vec![0u64; words];
        for r in (0..width).rev() {
            let target_bit = r < u64::BITS as usize && (target >> r) & 1 == 1;
            match (self.rows.get(r), target_bit) {
                (Some(row), true) => kernel.and_into(&mut equal, row),
                (None, true) => equal.fill(0),
                (Some(row), false) => {
                    scratch.copy_from_slice(&equal);
                    kernel.and_into(&mut scratch, row);
                    kernel.or_into(&mut greater, &scratch);
                    kernel.and_not_into(&mut equal, row);
                }
                (None, false) => {}
            }
        }
        kernel.or_into(&mut greater, &equal);
        greater
    }

    /// Encoded counter of every dimension (add [`minimum`](Self::minimum) for the true count).
    pub fn counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.words() * 64];
        for (r, row) in self.rows.iter().enumerate() {
            for (w, &word) in row.iter().enumerate() {
                let mut bits = word;
                while bits != 0 {
                    let bit = bits.trailing_zeros() as usize;
                    counts[w * 64 + bit] += 1 << r;
                    bits &= bits - 1;
                }
            }
        }
        counts
    }

    /// True counter of a single dimension.
    pub fn count(&self, index: usize) -> u64 {
        let (word, bit) = (index / 64, index % 64);
        let encoded: u64 = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| ((row[word] >> bit) & 1) << r)
            .sum();
        encoded + self.minimum
    }

    /// Seed for probabilistic conclusion: the wrapping sum of each row's first word.
    ///
    /// Identical records always produce the same seed, so normalizing an
    /// unchanged vector reproduces the same bits.
    pub fn superposition_seed(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |seed, row| seed.wrapping_add(row[0]))
    }

    /// Reset to a single row holding `bits`, as if freshly seeded with one vote.
    pub(crate) fn collapse(&mut self, bits: &[u64]) {
        self.rows = vec![bits.to_vec()];
        self.total_votes = 1;
        self.minimum = 0;
        self.stale = false;
    }

    /// Apply a validated block permutation to every row.
    pub(crate) fn permute(&mut self, permutation: &[usize]) {
        for row in &mut self.rows {
            super::permutation::apply(row, permutation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> Vec<u64> {
        assert_eq!(s.len(), 64);
        let mut word = 0u64;
        for (i, c) in s.chars().enumerate() {
            if c == '1' {
                word |= 1 << i;
            }
        }
        vec![word]
    }

    #[test]
    fn ripple_carry_counts() {
        let mut record = VotingRecord::seeded(&[0], 0);
        record.add_votes(&[0b1011], 5);
        let counts = record.counts();
        assert_eq!(counts[0] + record.minimum(), 5);
        assert_eq!(counts[1] + record.minimum(), 5);
        assert_eq!(counts[2] + record.minimum(), 0);
        assert_eq!(counts[3] + record.minimum(), 5);
        assert_eq!(record.total_votes(), 5);
        assert_eq!(record.row_count(), 3);
    }

    #[test]
    fn large_weights_grow_rows_logarithmically() {
        let mut record = VotingRecord::seeded(&[0, 0], 0);
        record.add_votes(&[0xFFFF, 0], 1000);
        assert_eq!(record.count(0), 1000);
        assert_eq!(record.count(16), 0);
        assert_eq!(record.row_count(), 10);
    }

    #[test]
    fn seed_row_counts_once() {
        let mut record = VotingRecord::seeded(&[0b01], 0);
        record.add_votes(&[0b11], 3);
        assert_eq!(record.count(0), 4);
        assert_eq!(record.count(1), 3);
        assert_eq!(record.count(2), 0);
        // Seed bits are not votes.
        assert_eq!(record.total_votes(), 3);
    }

    #[test]
    fn shared_weight_is_folded_into_minimum() {
        let mut record = VotingRecord::seeded(&[u64::MAX], 0);
        record.add_votes(&[0b1], 2);
        assert_eq!(record.minimum(), 1);
        assert_eq!(record.count(0), 3);
        assert_eq!(record.count(1), 1);
        assert_eq!(record.maximum_shared_weight(), 0);
    }

    #[test]
    fn complementary_patterns_fold_to_zero_shared_weight() {
        let low = pattern("0000111100001111000011110000111100001111000011110000111100001111");
        let high = pattern("1111000011110000111100001111000011110000111100001111000011110000");
        let mut record = VotingRecord::seeded(&[0], 0);
        record.add_votes(&low, 4);
        record.add_votes(&high, 8);
        assert_eq!(record.maximum_shared_weight(), 0);
        assert_eq!(record.total_votes(), 12);
        assert_eq!(record.count(4), 4);
        assert_eq!(record.count(0), 8);
    }

    fn record_with_rows(rows: Vec<Vec<u64>>) -> VotingRecord {
        VotingRecord {
            rows,
            minimum: 0,
            total_votes: 0,
            decimal_places: 0,
            stale: true,
        }
    }

    #[test]
    fn shared_weight_is_a_lower_bound() {
        // Dimension 0 holds 4 (100), dimension 1 holds 3 (011), the rest 4.
        // The scan credits 2, not 3.
        let record = record_with_rows(vec![vec![0b10], vec![0b10], vec![!0b10]]);
        assert_eq!(record.count(0), 4);
        assert_eq!(record.count(1), 3);
        assert_eq!(record.maximum_shared_weight(), 2);
    }

    #[test]
    fn decrement_preserves_true_counts() {
        let mut record = record_with_rows(vec![
            vec![0xAAAA_AAAA_AAAA_AAAA],
            vec![u64::MAX],
            vec![0x0F],
        ]);
        let before: Vec<u64> = (0..64).map(|i| record.count(i)).collect();
        record.decrement(2);
        let after: Vec<u64> = (0..64).map(|i| record.count(i)).collect();
        assert_eq!(before, after);
        assert_eq!(record.minimum(), 2);
        // Dimension 4 held exactly 2: its encoded value is now 0.
        assert_eq!(record.counts()[4], 0);
        assert_eq!(record.maximum_shared_weight(), 0);
    }

    #[test]
    fn exact_matches_and_at_least_agree_with_counts() {
        let mut record = VotingRecord::seeded(&[0x0F0F_0F0F_0F0F_0F0F, 0], 0);
        record.add_votes(&[0x00FF_00FF_00FF_00FF, 0xFFFF_0000_FFFF_0000], 3);
        record.add_votes(&[0x3333_3333_3333_3333, 0x5555_5555_5555_5555], 6);
        record.add_votes(&[0x0000_FFFF_0000_FFFF, 0x0F0F_F0F0_0F0F_F0F0], 2);
        let counts = record.counts();
        let max = *counts.iter().max().unwrap();
        for v in 0..=max + 2 {
            let exact = record.exact_matches(v);
            let least = record.at_least(v);
            for (d, &c) in counts.iter().enumerate() {
                let bit = |mask: &[u64]| (mask[d / 64] >> (d % 64)) & 1 == 1;
                assert_eq!(bit(&exact), c == v, "exact v={v} d={d}");
                assert_eq!(bit(&least), c >= v, "at_least v={v} d={d}");
            }
        }
    }

    #[test]
    fn seed_is_wrapping_sum_of_first_words() {
        let record = VotingRecord {
            rows: vec![vec![u64::MAX, 7], vec![2, 9]],
            minimum: 0,
            total_votes: 3,
            decimal_places: 0,
            stale: true,
        };
        assert_eq!(record.superposition_seed(), 1);
    }

    #[test]
    fn collapse_resets_bookkeeping() {
        let mut record = VotingRecord::seeded(&[0], 2);
        record.add_votes(&[0xFF], 250);
        record.collapse(&[0xF0]);
        assert_eq!(record.row_count(), 1);
        assert_eq!(record.total_votes(), 1);
        assert_eq!(record.minimum(), 0);
        assert_eq!(record.decimal_places(), 2);
        assert!(!record.is_stale());
    }
}
