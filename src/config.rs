//! YAML configuration file support.
//!
//! Lets deployments define the engine and toolkit settings in a single YAML
//! file loaded at startup:
//!
//! ```yaml
//! # molsearch configuration
//! version: "1.0"
//!
//! engine:
//!   screening_fingerprint: "pattern"
//!
//! toolkit:
//!   seed: 42
//!   parallel: false
//! ```
//!
//! Every section is optional and falls back to its defaults; `validate()`
//! runs on load so a bad file fails fast instead of surfacing later as an
//! engine error.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chem::NGramConfig;
use engine::EngineConfig;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the molsearch stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MolsearchConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Search engine settings.
    #[serde(default)]
    pub engine: EngineYamlConfig,

    /// Built-in toolkit settings.
    #[serde(default)]
    pub toolkit: ToolkitYamlConfig,
}

impl MolsearchConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MolsearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            other => return Err(ConfigLoadError::UnsupportedVersion(other.to_string())),
        }
        self.engine.validate()?;
        Ok(())
    }
}

impl Default for MolsearchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            engine: EngineYamlConfig::default(),
            toolkit: ToolkitYamlConfig::default(),
        }
    }
}

/// Engine section of the YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineYamlConfig {
    /// Fingerprint kind substructure screening runs against.
    #[serde(default = "default_screening_fingerprint")]
    pub screening_fingerprint: String,
}

impl EngineYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if registry::find(&self.screening_fingerprint).is_none() {
            return Err(ConfigLoadError::Validation(format!(
                "engine.screening_fingerprint `{}` is not a registered kind",
                self.screening_fingerprint
            )));
        }
        Ok(())
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            screening_fingerprint: self.screening_fingerprint.clone(),
        }
    }
}

impl Default for EngineYamlConfig {
    fn default() -> Self {
        Self {
            screening_fingerprint: default_screening_fingerprint(),
        }
    }
}

fn default_screening_fingerprint() -> String {
    engine::SCREENING_FINGERPRINT.to_string()
}

/// Toolkit section of the YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ToolkitYamlConfig {
    /// Feature-hash seed override; omit for the built-in default.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Score bulk-similarity targets on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

impl ToolkitYamlConfig {
    pub fn to_ngram_config(&self) -> NGramConfig {
        let mut config = NGramConfig {
            parallel: self.parallel,
            ..NGramConfig::default()
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}
