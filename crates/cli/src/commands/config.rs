use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::Serialize;
use storefront_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE};
use toml::Value;

use crate::commands::CommandResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

/// Effective configuration with the layer each value came from.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let entries = entries(&config);
    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        serde_json::to_value(&entries).ok(),
    )
}

pub fn entries(config: &AppConfig) -> Vec<ConfigEntry> {
    let path = detect_config_path();
    let doc = load_config_file_doc(path.as_deref());
    let source = |key: &str, env_keys: &[&str]| {
        field_source(key, env_keys, doc.as_ref(), path.as_deref())
    };

    let api_key = config
        .predictor
        .api_key
        .as_ref()
        .map(|key| redact_key(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        ConfigEntry {
            key: "database.url",
            value: config.database.url.clone(),
            source: source("database.url", &["STOREFRONT_DATABASE_URL"]),
        },
        ConfigEntry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            source: source("database.max_connections", &["STOREFRONT_DATABASE_MAX_CONNECTIONS"]),
        },
        ConfigEntry {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            source: source("database.timeout_secs", &["STOREFRONT_DATABASE_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "predictor.base_url",
            value: config.predictor.base_url.clone(),
            source: source("predictor.base_url", &["STOREFRONT_PREDICTOR_BASE_URL", "AI_API_URL"]),
        },
        ConfigEntry {
            key: "predictor.timeout_secs",
            value: config.predictor.timeout_secs.to_string(),
            source: source("predictor.timeout_secs", &["STOREFRONT_PREDICTOR_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "predictor.api_key",
            value: api_key,
            source: source("predictor.api_key", &["STOREFRONT_PREDICTOR_API_KEY"]),
        },
        ConfigEntry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", &["STOREFRONT_SERVER_BIND_ADDRESS"]),
        },
        ConfigEntry {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", &["STOREFRONT_SERVER_PORT"]),
        },
        ConfigEntry {
            key: "server.stats_queue_capacity",
            value: config.server.stats_queue_capacity.to_string(),
            source: source(
                "server.stats_queue_capacity",
                &["STOREFRONT_SERVER_STATS_QUEUE_CAPACITY"],
            ),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            source: source(
                "logging.format",
                &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
            ),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from(DEFAULT_CONFIG_FILE);
    if root.exists() {
        return Some(root);
    }

    let nested = Path::new("config").join(DEFAULT_CONFIG_FILE);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
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

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
