//! Rich diagnostic error types for the semvec engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the semvec engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SemvecError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vsa(#[from] VsaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias for code that crosses subsystems, such as the CLI.
pub type SemvecResult<T> = std::result::Result<T, SemvecError>;

// ---------------------------------------------------------------------------
// VSA errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum VsaError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(semvec::vsa::dim_mismatch),
        help(
            "All binary vectors in an operation must share the same dimension, \
             and a permutation must have exactly dimension/64 entries (one per \
             64-bit block). Check the Dimension used to create each operand."
        )
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid dimension {dimension}: must be a positive multiple of 64")]
    #[diagnostic(
        code(semvec::vsa::invalid_dimension),
        help(
            "Binary vectors are permuted in 64-bit blocks, so the dimension must be \
             a multiple of 64. 10048 is the nearest valid size to 10,000."
        )
    )]
    InvalidDimension { dimension: usize },

    #[error("format error: found {found} coordinates, expected {expected}")]
    #[diagnostic(
        code(semvec::vsa::format),
        help(
            "The textual form of a binary vector is exactly one '0' or '1' character \
             per dimension, with no delimiters or trailing newline."
        )
    )]
    FormatError { expected: usize, found: usize },

    #[error("invalid character {found:?} at coordinate {position}")]
    #[diagnostic(
        code(semvec::vsa::invalid_char),
        help("Only '0' and '1' may appear in the textual form of a binary vector.")
    )]
    InvalidCharacter { position: usize, found: char },

    #[error("invalid permutation: {message}")]
    #[diagnostic(
        code(semvec::vsa::invalid_permutation),
        help(
            "A block permutation must list every block index in 0..dimension/64 \
             exactly once. Build one with `shift_permutation` or invert an existing \
             one with `inverse_permutation`."
        )
    )]
    InvalidPermutation { message: String },

    #[error("empty bundle: cannot bundle zero vectors")]
    #[diagnostic(
        code(semvec::vsa::empty_bundle),
        help("Provide at least one (vector, weight) pair to the bundle operation.")
    )]
    EmptyBundle,

    #[error("I/O error while streaming a binary vector: {source}")]
    #[diagnostic(
        code(semvec::vsa::io),
        help(
            "The dense stream form is dimension/64 native-endian 64-bit words. \
             Check that the stream holds a whole vector of the expected dimension."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

/// Result type for vector operations.
pub type VsaResult<T> = std::result::Result<T, VsaError>;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(semvec::store::io),
        help(
            "A filesystem operation failed. Check that the snapshot path exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(semvec::store::serde),
        help(
            "Failed to serialize or deserialize a vector snapshot. \
             This usually means the snapshot was written by an incompatible version."
        )
    )]
    Serialization { message: String },

    #[error("snapshot dimension {actual} does not match store dimension {expected}")]
    #[diagnostic(
        code(semvec::store::dim_mismatch),
        help("Open the snapshot with a store created for the same dimension.")
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type for vector store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(semvec::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {path}")]
    #[diagnostic(
        code(semvec::config::write),
        help("Check that the parent directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(semvec::config::parse),
        help(
            "The config file is TOML. Valid keys are `dimension`, `decimal_places`, \
             `binding` (\"xor\" | \"permute\") and `normalization` \
             (\"probabilistic\" | \"majority\")."
        )
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(semvec::config::invalid),
        help("Fix the offending value; dimensions must be positive multiples of 64.")
    )]
    Invalid { message: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
