//! YAML configuration support for the facematch engine.
//!
//! One file describes the whole engine: the enrollment store backend and
//! the match acceptance policy. Selected values can be overridden from the
//! environment, which is how deployments tune the threshold and point at
//! their hosted registry without editing the file.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "plant-gate"
//!
//! store:
//!   backend: "rest"
//!   url: "https://registry.example.co"
//!   api_key: "service-role-key"
//!
//! matcher:
//!   threshold: 0.38
//! ```

use std::fs;
use std::path::Path;

use matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

/// Environment variable overriding `matcher.threshold`.
pub const MATCH_THRESHOLD_ENV: &str = "MATCH_THRESHOLD";
/// Environment variable overriding `store.url`.
pub const STORE_URL_ENV: &str = "FACEMATCH_STORE_URL";
/// Environment variable overriding `store.api_key`.
pub const STORE_KEY_ENV: &str = "FACEMATCH_STORE_KEY";

/// Errors that can occur when loading configuration.
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

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacematchConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Enrollment store configuration.
    #[serde(default)]
    pub store: StoreYamlConfig,

    /// Match acceptance policy.
    #[serde(default)]
    pub matcher: MatchYamlConfig,
}

impl FacematchConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FacematchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// The rest backend's url/api_key pair is checked in
    /// [`store_config`](Self::store_config), not here, so a file can omit
    /// them and have [`apply_env_overrides`](Self::apply_env_overrides)
    /// fill them in.
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.store.validate()?;
        self.matcher.validate()?;
        Ok(())
    }

    /// Apply environment overrides on top of the parsed file and re-validate.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigLoadError> {
        if let Ok(raw) = std::env::var(MATCH_THRESHOLD_ENV) {
            let threshold: f32 = raw.parse().map_err(|_| {
                ConfigLoadError::Validation(format!(
                    "{MATCH_THRESHOLD_ENV} must be a float, got {raw:?}"
                ))
            })?;
            self.matcher.threshold = threshold;
        }
        if let Ok(url) = std::env::var(STORE_URL_ENV) {
            self.store.url = Some(url);
        }
        if let Ok(key) = std::env::var(STORE_KEY_ENV) {
            self.store.api_key = Some(key);
        }
        self.validate()
    }

    /// Resolve the store section into a buildable backend config.
    pub fn store_config(&self) -> Result<StoreConfig, ConfigLoadError> {
        match self.store.backend.as_str() {
            "memory" => Ok(StoreConfig::in_memory()),
            "rest" => {
                let url = self.store.url.as_deref().ok_or_else(|| {
                    ConfigLoadError::Validation(
                        "store.url is required when backend is 'rest'".to_string(),
                    )
                })?;
                let api_key = self.store.api_key.as_deref().ok_or_else(|| {
                    ConfigLoadError::Validation(
                        "store.api_key is required when backend is 'rest'".to_string(),
                    )
                })?;
                Ok(StoreConfig::rest(url, api_key))
            }
            other => Err(ConfigLoadError::Validation(format!(
                "store.backend must be one of: [\"memory\", \"rest\"], got {other:?}"
            ))),
        }
    }

    /// Resolve the matcher section into an engine policy.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::with_threshold(self.matcher.threshold)
    }
}

impl Default for FacematchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            store: StoreYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
        }
    }
}

/// Enrollment store YAML section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreYamlConfig {
    #[serde(default = "default_store_backend")]
    pub backend: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

impl StoreYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_backends = ["memory", "rest"];
        if !valid_backends.contains(&self.backend.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "store.backend must be one of: {valid_backends:?}"
            )));
        }
        Ok(())
    }
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            api_key: None,
        }
    }
}

/// Matcher YAML section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchYamlConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl MatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        MatchConfig::with_threshold(self.threshold)
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))
    }
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

// Helper functions for serde defaults
fn default_store_backend() -> String {
    "memory".to_string()
}
fn default_threshold() -> f32 {
    0.38
}
