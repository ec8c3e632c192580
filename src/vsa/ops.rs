//! VSA operations: factories and a functional facade over [`BinaryVector`].
//!
//! `VsaOps` pins a dimension, the process-wide SIMD kernel and the
//! configured algebra settings, so callers do not have to thread
//! [`VectorOptions`] through every vector they create.

use crate::config::VsaConfig;
use crate::error::{ConfigResult, VsaError, VsaResult};
use crate::simd::{self, VsaKernel};

use super::permutation;
use super::vector::VectorOptions;
use super::{BinaryVector, Dimension, NormalizationMode};

/// VSA operations backed by a SIMD kernel.
pub struct VsaOps {
    kernel: &'static dyn VsaKernel,
    dim: Dimension,
    options: VectorOptions,
    normalization: NormalizationMode,
}

impl VsaOps {
    /// Operations at the given dimension with default settings.
    pub fn new(dim: Dimension) -> Self {
        Self::with_settings(dim, VectorOptions::default(), NormalizationMode::default())
    }

    /// Operations configured by a validated [`VsaConfig`].
    pub fn from_config(config: &VsaConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::with_settings(
            config.dim()?,
            config.vector_options(),
            config.normalization,
        ))
    }

    fn with_settings(
        dim: Dimension,
        options: VectorOptions,
        normalization: NormalizationMode,
    ) -> Self {
        let kernel = simd::kernel();
        tracing::info!(
            isa = %kernel.isa_level(),
            dimension = dim.get(),
            binding = %options.binding,
            normalization = %normalization,
            "vector operations ready"
        );
        Self {
            kernel,
            dim,
            options,
            normalization,
        }
    }

    /// The dimension these ops work with.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// The options stamped on every vector created here.
    pub fn options(&self) -> VectorOptions {
        self.options
    }

    /// The configured normalization strategy.
    pub fn normalization(&self) -> NormalizationMode {
        self.normalization
    }

    /// The SIMD instruction set level this kernel uses.
    pub fn isa_level(&self) -> simd::IsaLevel {
        self.kernel.isa_level()
    }

    /// An all-zero vector.
    pub fn zero(&self) -> BinaryVector {
        BinaryVector::zero(self.dim).with_options(self.options)
    }

    /// A random balanced elemental vector.
    pub fn random(&self, rng: &mut impl rand::Rng) -> BinaryVector {
        BinaryVector::random(self.dim, rng).with_options(self.options)
    }

    fn check(&self, v: &BinaryVector) -> VsaResult<()> {
        if v.dimension() != self.dim {
            return Err(VsaError::DimensionMismatch {
                expected: self.dim.get(),
                actual: v.dimension().get(),
            });
        }
        Ok(())
    }

    /// Bind two vectors into a new one, using the configured binding.
    pub fn bind(&self, a: &BinaryVector, b: &BinaryVector) -> VsaResult<BinaryVector> {
        self.check(a)?;
        let mut out = a.clone().with_options(self.options);
        out.bind(b)?;
        Ok(out)
    }

    /// Recover the vector bound to `key` in `bound`.
    ///
    /// For XOR binding this is `bind` again. For permute binding the result
    /// is the left operand of the original `bind(a, key)`.
    pub fn unbind(&self, bound: &BinaryVector, key: &BinaryVector) -> VsaResult<BinaryVector> {
        self.check(bound)?;
        let mut out = bound.clone().with_options(self.options);
        out.release(key)?;
        Ok(out)
    }

    /// Overlap in `[0, 1]`: 1.0 identical, about 0.5 unrelated, 0.0 if either is zero.
    pub fn similarity(&self, a: &BinaryVector, b: &BinaryVector) -> VsaResult<f64> {
        self.check(a)?;
        a.measure_overlap(b)
    }

    /// Superpose weighted vectors into a fresh vector and normalize it with
    /// the configured strategy.
    pub fn bundle(&self, items: &[(&BinaryVector, f64)]) -> VsaResult<BinaryVector> {
        if items.is_empty() {
            return Err(VsaError::EmptyBundle);
        }
        let mut out = self.zero();
        for &(vector, weight) in items {
            out.superpose(vector, weight, None)?;
        }
        self.normalize(&mut out);
        Ok(out)
    }

    /// A copy of `v` with its blocks rotated by `shift`.
    pub fn permute(&self, v: &BinaryVector, shift: i64) -> VsaResult<BinaryVector> {
        let mut out = v.clone();
        out.permute(&self.shift_permutation(shift))?;
        Ok(out)
    }

    /// Normalize with the configured strategy.
    pub fn normalize(&self, v: &mut BinaryVector) {
        v.normalize_with(self.normalization);
    }

    /// Block rotation at this dimension.
    pub fn shift_permutation(&self, shift: i64) -> Vec<usize> {
        permutation::shift_permutation(self.dim, shift)
    }
}

impl std::fmt::Debug for VsaOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VsaOps")
            .field("dim", &self.dim)
            .field("options", &self.options)
            .field("normalization", &self.normalization)
            .field("isa", &self.kernel.isa_level())
            .finish()
    }
}
