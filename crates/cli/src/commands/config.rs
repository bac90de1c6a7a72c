use std::env;
use std::fs;
use std::path::Path;

use basketry_core::config::{resolve_config_path, LoadOptions};
use serde_json::{json, Value};

use crate::commands::{load_config, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());

    let outcome = load_config(options).map(|config| {
        let config_file_doc = load_config_file_doc(config_file_path.as_deref());
        let entry = |key_path: &str, value: Value, env_keys: &[&str]| {
            let source = field_source(
                key_path,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            );
            json!({ "key": key_path, "value": value, "source": source })
        };

        let values = vec![
            entry(
                "recommender.limit",
                json!(config.recommender.limit),
                &["BASKETRY_RECOMMENDER_LIMIT"],
            ),
            entry(
                "recommender.unbounded",
                json!(config.recommender.unbounded),
                &["BASKETRY_RECOMMENDER_UNBOUNDED"],
            ),
            entry(
                "recommender.sort_by",
                json!(config.recommender.sort_by),
                &["BASKETRY_RECOMMENDER_SORT_BY"],
            ),
            entry(
                "mining.min_support",
                json!(config.mining.min_support),
                &["BASKETRY_MINING_MIN_SUPPORT"],
            ),
            entry(
                "mining.min_confidence",
                json!(config.mining.min_confidence),
                &["BASKETRY_MINING_MIN_CONFIDENCE"],
            ),
            entry(
                "logging.level",
                json!(config.logging.level),
                &["BASKETRY_LOGGING_LEVEL", "BASKETRY_LOG_LEVEL"],
            ),
            entry(
                "logging.format",
                json!(config.logging.format),
                &["BASKETRY_LOGGING_FORMAT", "BASKETRY_LOG_FORMAT"],
            ),
        ];

        let data = json!({
            "config_file": config_file_path.as_ref().map(|path| path.display().to_string()),
            "values": values,
        });
        ("effective config (source precedence: env > file > default)".to_string(), data)
    });

    CommandResult::from_outcome("config", outcome)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<toml::Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<toml::Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&toml::Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &toml::Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
