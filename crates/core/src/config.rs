use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bundles::{BundleLimit, DEFAULT_BUNDLE_LIMIT};
use crate::domain::rule::RuleMetric;
use crate::errors::MiningError;
use crate::mining::MiningThresholds;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub recommender: RecommenderConfig,
    pub mining: MiningConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommenderConfig {
    pub limit: usize,
    pub unbounded: bool,
    pub sort_by: Option<RuleMetric>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MiningConfig {
    pub min_support: f64,
    pub min_confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub limit: Option<usize>,
    pub unbounded: Option<bool>,
    pub sort_by: Option<RuleMetric>,
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recommender: RecommenderConfig {
                limit: DEFAULT_BUNDLE_LIMIT,
                unbounded: false,
                sort_by: None,
            },
            mining: MiningConfig { min_support: 0.01, min_confidence: 0.5 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl RecommenderConfig {
    pub fn bundle_limit(&self) -> BundleLimit {
        if self.unbounded {
            return BundleLimit::Unbounded;
        }
        BundleLimit::top(self.limit).unwrap_or_default()
    }
}

impl MiningConfig {
    pub fn thresholds(&self) -> Result<MiningThresholds, MiningError> {
        MiningThresholds::new(self.min_support, self.min_confidence)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("basketry.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(recommender) = patch.recommender {
            if let Some(limit) = recommender.limit {
                self.recommender.limit = limit;
            }
            if let Some(unbounded) = recommender.unbounded {
                self.recommender.unbounded = unbounded;
            }
            if let Some(sort_by) = recommender.sort_by {
                self.recommender.sort_by = Some(sort_by);
            }
        }

        if let Some(mining) = patch.mining {
            if let Some(min_support) = mining.min_support {
                self.mining.min_support = min_support;
            }
            if let Some(min_confidence) = mining.min_confidence {
                self.mining.min_confidence = min_confidence;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BASKETRY_RECOMMENDER_LIMIT") {
            self.recommender.limit = parse_usize("BASKETRY_RECOMMENDER_LIMIT", &value)?;
        }
        if let Some(value) = read_env("BASKETRY_RECOMMENDER_UNBOUNDED") {
            self.recommender.unbounded = parse_bool("BASKETRY_RECOMMENDER_UNBOUNDED", &value)?;
        }
        if let Some(value) = read_env("BASKETRY_RECOMMENDER_SORT_BY") {
            self.recommender.sort_by = Some(value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "BASKETRY_RECOMMENDER_SORT_BY".to_string(),
                    value: value.clone(),
                }
            })?);
        }

        if let Some(value) = read_env("BASKETRY_MINING_MIN_SUPPORT") {
            self.mining.min_support = parse_f64("BASKETRY_MINING_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("BASKETRY_MINING_MIN_CONFIDENCE") {
            self.mining.min_confidence = parse_f64("BASKETRY_MINING_MIN_CONFIDENCE", &value)?;
        }

        let log_level =
            read_env("BASKETRY_LOGGING_LEVEL").or_else(|| read_env("BASKETRY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BASKETRY_LOGGING_FORMAT").or_else(|| read_env("BASKETRY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(limit) = overrides.limit {
            self.recommender.limit = limit;
        }
        if let Some(unbounded) = overrides.unbounded {
            self.recommender.unbounded = unbounded;
        }
        if let Some(sort_by) = overrides.sort_by {
            self.recommender.sort_by = Some(sort_by);
        }
        if let Some(min_support) = overrides.min_support {
            self.mining.min_support = min_support;
        }
        if let Some(min_confidence) = overrides.min_confidence {
            self.mining.min_confidence = min_confidence;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_recommender(&self.recommender)?;
        validate_mining(&self.mining)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Path of the config file `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("basketry.toml"), PathBuf::from("config/basketry.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_recommender(recommender: &RecommenderConfig) -> Result<(), ConfigError> {
    if recommender.limit == 0 {
        return Err(ConfigError::Validation(
            "recommender.limit must be greater than zero (set recommender.unbounded = true to keep every item)"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_mining(mining: &MiningConfig) -> Result<(), ConfigError> {
    mining.thresholds().map(|_| ()).map_err(|error| {
        ConfigError::Validation(format!("mining thresholds are invalid: {error}"))
    })
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    recommender: Option<RecommenderPatch>,
    mining: Option<MiningPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommenderPatch {
    limit: Option<usize>,
    unbounded: Option<bool>,
    sort_by: Option<RuleMetric>,
}

#[derive(Debug, Default, Deserialize)]
struct MiningPatch {
    min_support: Option<f64>,
    min_confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
