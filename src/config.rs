use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Upper bound accepted for `max_expression_depth`.
///
/// The builder recurses once per nesting level; this keeps the deepest
/// accepted expression well inside a 2 MiB thread stack in debug builds.
pub const MAX_EXPRESSION_DEPTH: u32 = 512;

/// How `during duration D to Y` is compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DurationToPolicy {
    /// Lower bound is `Y - D`, mirroring `from X duration D`.
    #[default]
    Subtract,
    /// Fail with `UnsupportedLiteralForm`.
    Reject,
}

#[derive(Error, Debug)]
#[error("expected `subtract` or `reject`, got `{0}`")]
pub struct ParsePolicyError(String);

impl FromStr for DurationToPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtract" => Ok(DurationToPolicy::Subtract),
            "reject" => Ok(DurationToPolicy::Reject),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Predicate compiler configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting depth of an expression (guards against runaway recursion
    /// on hostile or cyclic ASTs)
    #[validate(range(
        min = 1,
        max = 512,
        message = "Max expression depth must be between 1 and 512"
    ))]
    pub max_expression_depth: u32,

    /// Handling of the `duration D to Y` timespan form
    pub duration_to_policy: DurationToPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_expression_depth: 256,
            duration_to_policy: DurationToPolicy::Subtract,
        }
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_expression_depth: parse_env_var("CQL_MAX_DEPTH", "256")?,
            duration_to_policy: parse_env_var("CQL_DURATION_TO_POLICY", "subtract")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides on top of this configuration, then re-validate
    pub fn merge(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if let Some(depth) = overrides.max_expression_depth {
            self.max_expression_depth = depth;
        }
        if let Some(policy) = overrides.duration_to_policy {
            self.duration_to_policy = policy;
        }
        self.validate()?;
        Ok(())
    }
}

/// Optional CLI flags layered over a file or environment configuration
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub max_expression_depth: Option<u32>,
    pub duration_to_policy: Option<DurationToPolicy>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
