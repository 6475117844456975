//! Environment-backed configuration.
//!
//! Thresholds and endpoints have defaults. Override with `FORMSENSE_*`
//! environment variables; only the database URL is required.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_KEYWORD_ACCEPT, DEFAULT_TEXT_HEAVY_CUTOFF, DEFAULT_ZERO_SHOT_ACCEPT};
use crate::store::MatchStrategy;

/// Default zero-shot text endpoint when `FORMSENSE_TEXT_CLASSIFIER_URL` is
/// not set.
pub const DEFAULT_TEXT_CLASSIFIER_URL: &str = "http://localhost:8001/classify/text";

/// Default zero-shot image endpoint when `FORMSENSE_IMAGE_CLASSIFIER_URL` is
/// not set.
pub const DEFAULT_IMAGE_CLASSIFIER_URL: &str = "http://localhost:8002/classify/image";

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FORMSENSE_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the keyword signature file (JSON). Default:
    /// `./signatures.json`.
    pub signature_index_path: PathBuf,

    /// Zero-shot text classifier endpoint.
    pub text_classifier_url: String,

    /// Zero-shot image classifier endpoint.
    pub image_classifier_url: String,

    /// Postgres connection string. Required.
    pub database_url: String,

    /// Minimum raw keyword overlap to accept stage 1. Default: `0.5`.
    pub keyword_accept: f64,

    /// Minimum zero-shot probability to accept stages 2 and 4. Default:
    /// `0.6`.
    pub zero_shot_accept: f64,

    /// Token count above which a page skips the image stage. Default: `100`.
    pub text_heavy_cutoff: usize,

    /// Entity identifier matching strategy. Default: exact.
    pub match_strategy: MatchStrategy,
}

impl Config {
    const ENV_SIGNATURE_INDEX_PATH: &'static str = "FORMSENSE_SIGNATURE_INDEX_PATH";
    const ENV_TEXT_CLASSIFIER_URL: &'static str = "FORMSENSE_TEXT_CLASSIFIER_URL";
    const ENV_IMAGE_CLASSIFIER_URL: &'static str = "FORMSENSE_IMAGE_CLASSIFIER_URL";
    const ENV_DATABASE_URL: &'static str = "FORMSENSE_DATABASE_URL";
    const ENV_KEYWORD_ACCEPT: &'static str = "FORMSENSE_KEYWORD_ACCEPT";
    const ENV_ZERO_SHOT_ACCEPT: &'static str = "FORMSENSE_ZERO_SHOT_ACCEPT";
    const ENV_TEXT_HEAVY_CUTOFF: &'static str = "FORMSENSE_TEXT_HEAVY_CUTOFF";
    const ENV_MATCH_STRATEGY: &'static str = "FORMSENSE_MATCH_STRATEGY";

    /// Loads configuration from environment variables (falling back to
    /// defaults where one exists).
    pub fn from_env() -> Result<Self, ConfigError> {
        let signature_index_path = Self::parse_path_from_env(
            Self::ENV_SIGNATURE_INDEX_PATH,
            PathBuf::from("./signatures.json"),
        );
        let text_classifier_url = Self::parse_string_from_env(
            Self::ENV_TEXT_CLASSIFIER_URL,
            DEFAULT_TEXT_CLASSIFIER_URL.to_string(),
        );
        let image_classifier_url = Self::parse_string_from_env(
            Self::ENV_IMAGE_CLASSIFIER_URL,
            DEFAULT_IMAGE_CLASSIFIER_URL.to_string(),
        );
        let database_url =
            env::var(Self::ENV_DATABASE_URL).map_err(|_| ConfigError::MissingEnvVar {
                name: Self::ENV_DATABASE_URL,
            })?;
        let keyword_accept =
            Self::parse_f64_from_env(Self::ENV_KEYWORD_ACCEPT, DEFAULT_KEYWORD_ACCEPT)?;
        let zero_shot_accept =
            Self::parse_f64_from_env(Self::ENV_ZERO_SHOT_ACCEPT, DEFAULT_ZERO_SHOT_ACCEPT)?;
        let text_heavy_cutoff =
            Self::parse_usize_from_env(Self::ENV_TEXT_HEAVY_CUTOFF, DEFAULT_TEXT_HEAVY_CUTOFF)?;
        let match_strategy = Self::parse_strategy_from_env()?;

        Ok(Self {
            signature_index_path,
            text_classifier_url,
            image_classifier_url,
            database_url,
            keyword_accept,
            zero_shot_accept,
            text_heavy_cutoff,
            match_strategy,
        })
    }

    /// Validates thresholds and the signature path (does not touch the
    /// network or the database).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (Self::ENV_KEYWORD_ACCEPT, self.keyword_accept),
            (Self::ENV_ZERO_SHOT_ACCEPT, self.zero_shot_accept),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if !self.signature_index_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.signature_index_path.clone(),
            });
        }
        if !self.signature_index_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.signature_index_path.clone(),
            });
        }

        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_f64_from_env(var_name: &'static str, default: f64) -> Result<f64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name,
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_usize_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name,
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_strategy_from_env() -> Result<MatchStrategy, ConfigError> {
        match env::var(Self::ENV_MATCH_STRATEGY) {
            Ok(value) => Ok(value.parse()?),
            Err(_) => Ok(MatchStrategy::default()),
        }
    }
}

impl From<&Config> for crate::classify::CascadeConfig {
    fn from(config: &Config) -> Self {
        Self {
            keyword_accept: config.keyword_accept,
            zero_shot_accept: config.zero_shot_accept,
            text_heavy_cutoff: config.text_heavy_cutoff,
        }
    }
}
