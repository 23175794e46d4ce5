use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_url: String,
    pub order_url: String,
    pub username: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:8080/inventory".into(),
            order_url: "http://127.0.0.1:8080/inventory".into(),
            username: "guest".into(),
            auth_token: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    catalog_url: Option<String>,
    order_url: Option<String>,
    username: Option<String>,
    auth_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Parsed endpoint addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub catalog: Url,
    pub order: Url,
}

impl Settings {
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Ok(Endpoints {
            catalog: parse_url("catalog_url", &self.catalog_url)?,
            order: parse_url("order_url", &self.order_url)?,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit `path` must exist; the default `storefront.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    match path {
        Some(path) => apply_file(&mut settings, path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                apply_file(&mut settings, default_path)?;
            }
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, path: &Path) -> Result<(), ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file_cfg: FileSettings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");

    if let Some(v) = file_cfg.catalog_url {
        settings.catalog_url = v;
    }
    if let Some(v) = file_cfg.order_url {
        settings.order_url = v;
    }
    if let Some(v) = file_cfg.username {
        settings.username = v;
    }
    if let Some(v) = file_cfg.auth_token {
        settings.auth_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    Ok(())
}

pub fn apply_env_overrides<F>(settings: &mut Settings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("STOREFRONT_CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Some(v) = var("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Some(v) = var("STOREFRONT_ORDER_URL") {
        settings.order_url = v;
    }
    if let Some(v) = var("APP__ORDER_URL") {
        settings.order_url = v;
    }

    if let Some(v) = var("STOREFRONT_USER") {
        settings.username = v;
    }
    if let Some(v) = var("STOREFRONT_AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}
