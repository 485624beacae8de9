use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Deserialize;
use std::path::Path;
use tri_fractal::{DecoderOptions, EncoderOptions, ImageType};

use crate::error::ConfigError;

/// Application configuration loaded from a YAML file
///
/// ```yaml
/// mode: color
/// encoder:
///   error-cutoff: 8.0
///   divide: high-entropy
/// decoder:
///   iterations: 30
///   fix-errors: true
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Channel mode for encoding; detected from the input image if unset
    #[serde(default)]
    pub mode: Option<ImageType>,

    /// Encoder settings
    #[serde(default)]
    pub encoder: EncoderOptions,

    /// Decoder settings
    #[serde(default)]
    pub decoder: DecoderOptions,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            cutoff = config.encoder.error_cutoff,
            iterations = config.decoder.iterations,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Parse a kebab-case option name such as `high-entropy` into one of the
/// codec's option enums. Used as a clap value parser.
pub fn parse_option<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        value.into_deserializer();
    T::deserialize(deserializer).map_err(|e| e.to_string())
}
