//! Engine configuration, persisted as TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::vsa::vector::VectorOptions;
use crate::vsa::{BindingMode, Dimension, NormalizationMode};

/// Largest supported weight precision; `10^decimal_places` scales every weight.
pub const MAX_DECIMAL_PLACES: u32 = 9;

/// Vector algebra settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VsaConfig {
    /// Vector dimension in bits (a positive multiple of 64).
    pub dimension: usize,
    /// Fraction digits kept when the first superposed weight is not integral.
    pub decimal_places: u32,
    /// How `bind` / `release` combine vectors.
    pub binding: BindingMode,
    /// How semantic vectors are concluded by [`VsaOps::normalize`](crate::vsa::ops::VsaOps::normalize).
    pub normalization: NormalizationMode,
}

impl Default for VsaConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::DEFAULT.get(),
            decimal_places: 2,
            binding: BindingMode::default(),
            normalization: NormalizationMode::default(),
        }
    }
}

impl VsaConfig {
    /// The validated dimension.
    pub fn dim(&self) -> ConfigResult<Dimension> {
        Dimension::new(self.dimension).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.dim()?;
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::Invalid {
                message: format!(
                    "decimal_places {} exceeds the maximum of {MAX_DECIMAL_PLACES}",
                    self.decimal_places
                ),
            });
        }
        Ok(())
    }

    /// The per-vector options implied by this configuration.
    pub fn vector_options(&self) -> VectorOptions {
        VectorOptions {
            binding: self.binding,
            fractional_decimal_places: self.decimal_places,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, path: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), dimension = config.dimension, "loaded config");
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
