use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use papyra_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", "PAPYRA_DATABASE_URL"),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", "PAPYRA_DATABASE_MAX_CONNECTIONS"),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", "PAPYRA_DATABASE_TIMEOUT_SECS"),
    ));

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line("llm.api_key", llm_api_key, source("llm.api_key", "PAPYRA_LLM_API_KEY")));
    lines.push(render_line("llm.model", &config.llm.model, source("llm.model", "PAPYRA_LLM_MODEL")));
    lines.push(render_line(
        "llm.base_url",
        &config.llm.base_url,
        source("llm.base_url", "PAPYRA_LLM_BASE_URL"),
    ));

    lines.push(render_line(
        "webhook.enabled",
        &config.webhook.enabled.to_string(),
        source("webhook.enabled", "PAPYRA_WEBHOOK_ENABLED"),
    ));
    lines.push(render_line(
        "webhook.handover_url",
        &config.webhook.handover_url,
        source("webhook.handover_url", "PAPYRA_WEBHOOK_HANDOVER_URL"),
    ));

    lines.push(render_line(
        "alerts.admin_email",
        config.alerts.admin_email.as_deref().unwrap_or("<unset>"),
        source("alerts.admin_email", "PAPYRA_ALERTS_ADMIN_EMAIL"),
    ));
    lines.push(render_line(
        "alerts.admin_phone",
        config.alerts.admin_phone.as_deref().unwrap_or("<unset>"),
        source("alerts.admin_phone", "PAPYRA_ALERTS_ADMIN_PHONE"),
    ));
    lines.push(render_line(
        "alerts.notify_email",
        &config.alerts.notify_email.to_string(),
        source("alerts.notify_email", "PAPYRA_ALERTS_NOTIFY_EMAIL"),
    ));
    lines.push(render_line(
        "alerts.notify_whatsapp",
        &config.alerts.notify_whatsapp.to_string(),
        source("alerts.notify_whatsapp", "PAPYRA_ALERTS_NOTIFY_WHATSAPP"),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", "PAPYRA_SERVER_BIND_ADDRESS"),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", "PAPYRA_SERVER_PORT"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "PAPYRA_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "PAPYRA_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("papyra.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/papyra.toml");
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
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
