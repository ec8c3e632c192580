//! Dense stream, text and serde forms of binary vectors.
//!
//! Every form carries only the dense bits; a semantic vector's pending votes
//! are tallied by majority rule on the way out and the voting record is not
//! persisted. Reading always yields an elemental vector.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{VsaError, VsaResult};

use super::{BinaryVector, Dimension};

impl BinaryVector {
    /// Text form: one `'0'` or `'1'` per dimension, bit 0 first.
    pub fn to_bit_string(&self) -> String {
        let words = self.dense_words();
        (0..self.dimension().get())
            .map(|i| if (words[i / 64] >> (i % 64)) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    /// Parse the text form produced by [`to_bit_string`](Self::to_bit_string).
    ///
    /// The string must hold exactly `dimension` characters, each `'0'` or `'1'`.
    pub fn from_bit_string(dim: Dimension, text: &str) -> VsaResult<Self> {
        let found = text.chars().count();
        if found != dim.get() {
            return Err(VsaError::FormatError {
                expected: dim.get(),
                found,
            });
        }
        let mut words = vec![0u64; dim.words()];
        for (position, c) in text.chars().enumerate() {
            match c {
                '0' => {}
                '1' => words[position / 64] |= 1 << (position % 64),
                found => return Err(VsaError::InvalidCharacter { position, found }),
            }
        }
        Self::from_words(dim, words)
    }

    /// Replace this vector's contents with the parsed text form, keeping its
    /// dimension and options. The vector becomes elemental.
    ///
    /// On error the vector is left unchanged.
    pub fn read_from_string(&mut self, text: &str) -> VsaResult<()> {
        let parsed = Self::from_bit_string(self.dimension(), text)?;
        *self = parsed.with_options(self.options());
        Ok(())
    }

    /// Write the dense form: `dimension / 64` native-endian 64-bit words.
    pub fn write_words<W: Write>(&self, writer: &mut W) -> VsaResult<()> {
        for word in self.dense_words().iter() {
            writer
                .write_all(&word.to_ne_bytes())
                .map_err(|source| VsaError::Io { source })?;
        }
        Ok(())
    }

    /// Read a vector of the given dimension from its dense form.
    pub fn read_words<R: Read>(dim: Dimension, reader: &mut R) -> VsaResult<Self> {
        let mut words = Vec::with_capacity(dim.words());
        let mut buf = [0u8; 8];
        for _ in 0..dim.words() {
            reader
                .read_exact(&mut buf)
                .map_err(|source| VsaError::Io { source })?;
            words.push(u64::from_ne_bytes(buf));
        }
        Self::from_words(dim, words)
    }
}

/// Serde representation of a binary vector's dense bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseVector {
    pub dimension: Dimension,
    pub words: Vec<u64>,
}

impl From<&BinaryVector> for DenseVector {
    fn from(vector: &BinaryVector) -> Self {
        Self {
            dimension: vector.dimension(),
            words: vector.dense_words().into_owned(),
        }
    }
}

impl TryFrom<DenseVector> for BinaryVector {
    type Error = VsaError;

    fn try_from(dense: DenseVector) -> VsaResult<Self> {
        BinaryVector::from_words(dense.dimension, dense.words)
    }
}
