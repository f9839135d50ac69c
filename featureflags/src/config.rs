use rollout::config::{Config as RolloutConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;

#[derive(Clone, Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

fn default_level() -> String {
    "info".into()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub rollout: RolloutConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data: Config = serde_yaml::from_reader(file)?;
        data.rollout.validate()?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            logging:
                level: debug
                sentry_dsn: https://key@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            rollout:
                listener:
                    host: 0.0.0.0
                    port: 7071
                features:
                    BetaFeature:
                        users: [alpha@demo.com]
                        rollout_percentage: 20
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common.logging.level, "debug");
        assert_eq!(
            config.common.logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(config.rollout.listener.host, "0.0.0.0");
        assert_eq!(
            config.rollout.features["BetaFeature"].users,
            vec!["alpha@demo.com".to_string()]
        );
    }

    #[test]
    fn minimal_config() {
        let yaml = r#"
            rollout:
                features:
                    BetaFeature:
                        rollout_percentage: 50
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common.logging.level, "info");
        assert!(config.common.logging.sentry_dsn.is_none());
        assert!(config.common.metrics.is_none());
        assert_eq!(config.rollout.feature_name, "BetaFeature");
    }

    #[test]
    fn invalid_config() {
        let tmp = write_tmp_file("rollout:\n  features: {}\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Invalid(ValidationError::UnknownFeature(_)))
        ));

        let tmp = write_tmp_file("rollout: [not, a, map]\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));

        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/config.yaml")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
