use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::playlist_client::DEFAULT_REQUEST_TIMEOUT;

pub const DEFAULT_SETTINGS_PATH: &str = "tempo.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub service_url: String,
    pub request_timeout_secs: u64,
    pub user_id: Option<String>,
    pub default_queries: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:5000".into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            user_id: None,
            default_queries: vec![
                "genre:rock".into(),
                "genre:electronic".into(),
                "running tempo".into(),
            ],
        }
    }
}

impl Settings {
    /// Zero reads as the default budget.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => DEFAULT_REQUEST_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    request_timeout_secs: Option<u64>,
    user_id: Option<String>,
    default_queries: Option<Vec<String>>,
}

/// Defaults, then the TOML file at `path` if present, then environment.
pub fn load_settings(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let path = path.as_ref();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.service_url = normalize_service_url(&settings.service_url);
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    match file_cfg.request_timeout_secs {
        Some(0) => warn!("config: ignoring request_timeout_secs = 0 in settings file"),
        Some(v) => settings.request_timeout_secs = v,
        None => {}
    }
    if let Some(v) = file_cfg.user_id {
        settings.user_id = Some(v);
    }
    if let Some(v) = file_cfg.default_queries {
        settings.default_queries = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TEMPO_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(0) => warn!("config: ignoring zero APP__REQUEST_TIMEOUT_SECS"),
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "config: ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = var("TEMPO_USER_ID") {
        settings.user_id = Some(v);
    }
    if let Some(v) = var("APP__USER_ID") {
        settings.user_id = Some(v);
    }
}

/// Bare hosts such as `76.72.29.135` get an `http://` scheme; trailing
/// slashes are dropped so paths can be appended.
pub fn normalize_service_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().service_url;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
