use directories::BaseDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("backend_url is not a valid url: {0}")]
    BadBackendUrl(String),
    #[error("webhook_url is not a valid url: {0}")]
    BadWebhookUrl(String),
}

/// Dashboard configuration, read from `wadash.toml` in the user config
/// directory. Every field has a default so a missing file still yields a
/// usable (localhost) setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the conversation backend.
    pub backend_url: String,
    /// Delivery webhook for outbound messages. Empty disables sending.
    pub webhook_url: String,
    /// Shared dashboard password. Empty disables the gate.
    pub password: String,
    /// Optional text banner printed at startup.
    pub logo_path: Option<String>,
    pub page_size: usize,
    pub request_timeout_secs: u64,
    pub send_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            webhook_url: String::new(),
            password: String::new(),
            logo_path: None,
            page_size: 20,
            request_timeout_secs: 10,
            send_timeout_secs: 15,
        }
    }
}

impl Config {
    fn path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("wadash.toml"))
    }

    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("ignoring unreadable config {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                // first run: leave a template behind so the fields are
                // discoverable without documentation
                let cfg = Self::default();
                let _ = cfg.save_to(path);
                cfg
            }
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config dir",
            ));
        };
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.backend_url)
            .map_err(|_| ConfigError::BadBackendUrl(self.backend_url.clone()))?;
        if !self.webhook_url.trim().is_empty() {
            Url::parse(&self.webhook_url)
                .map_err(|_| ConfigError::BadWebhookUrl(self.webhook_url.clone()))?;
        }
        Ok(())
    }
}
