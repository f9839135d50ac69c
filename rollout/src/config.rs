use crate::bucket::Percentage;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_FEATURE_NAME: &str = "BetaFeature";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty feature name")]
    EmptyFeatureName,

    #[error("Feature {0} is served but has no configuration")]
    UnknownFeature(String),
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }

    fn default_public() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 7071,
        }
    }

    fn default_admin() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 7072,
        }
    }
}

/// Static rollout settings for a single feature.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// Identifiers that always have the feature, regardless of their bucket.
    /// Matched case-insensitively.
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub rollout_percentage: Percentage,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the feature endpoints
    #[serde(default = "Listener::default_public")]
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::default_admin")]
    pub admin_listener: Listener,
    /// The feature the endpoints report on
    #[serde(default = "default_feature_name")]
    pub feature_name: String,
    #[serde(default)]
    pub features: HashMap<String, FeatureConfig>,
}

fn default_feature_name() -> String {
    DEFAULT_FEATURE_NAME.into()
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.feature_name.is_empty() {
            return Err(ValidationError::EmptyFeatureName);
        }

        if !self.features.contains_key(&self.feature_name) {
            return Err(ValidationError::UnknownFeature(self.feature_name.clone()));
        }

        Ok(())
    }
}
