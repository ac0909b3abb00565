use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use malloy_core::config::{AppConfig, LoadOptions};
use malloy_core::Capabilities;
use toml::Value;

pub fn run(options: LoadOptions) -> String {
    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let overrides = options.overrides.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str, overridden: bool| {
        if overridden {
            return "cli override".to_string();
        }
        field_source(key_path, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];

    lines.push(render_line(
        "decoder.tabular",
        &config.decoder.tabular.to_string(),
        source("decoder.tabular", "MALLOY_DECODER_TABULAR", overrides.tabular.is_some()),
    ));
    lines.push(render_line(
        "decoder.parse_timestamps",
        &config.decoder.parse_timestamps.to_string(),
        source(
            "decoder.parse_timestamps",
            "MALLOY_DECODER_PARSE_TIMESTAMPS",
            overrides.parse_timestamps.is_some(),
        ),
    ));
    lines.push(render_line(
        "output.format",
        &format!("{:?}", config.output.format),
        source("output.format", "MALLOY_OUTPUT_FORMAT", overrides.output_format.is_some()),
    ));
    lines.push(render_line(
        "output.max_rows",
        &config.output.max_rows.to_string(),
        source("output.max_rows", "MALLOY_OUTPUT_MAX_ROWS", overrides.max_rows.is_some()),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "MALLOY_LOGGING_LEVEL", overrides.log_level.is_some()),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "MALLOY_LOGGING_FORMAT", false),
    ));

    let capabilities = Capabilities::from_config(&config.decoder);
    lines.push(format!(
        "effective capabilities: tabular={} timestamps={}",
        capabilities.tabular, capabilities.timestamps
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("malloy.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/malloy.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
