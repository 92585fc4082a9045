use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{config_json_path, load_config_json, session_dir};

/// Backend address used when neither the config file nor the environment sets one.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_proxy: String,
    pub https_proxy: String,
    pub api_base: Option<String>,
    /// Directory holding the persisted session entries.
    pub data_dir: Option<PathBuf>,
    /// Re-fetch `/auth/me` when restoring a stored session.
    pub verify_session: bool,
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Config {
    /// Loads `~/.insuredocs/config.json`, falling back to `./config.toml`,
    /// then applies environment overrides.
    pub fn new() -> Self {
        let mut config = Self::from_files(&config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn from_files(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match load_config_json::<Config>(json_path) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {e}", json_path.display()),
            }
        }

        if toml_path.exists() {
            if let Ok(content) = std::fs::read_to_string(toml_path) {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring {}: {e}", toml_path.display()),
                }
            }
        }

        Config::default()
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(api_base) = lookup("INSUREDOCS_API_BASE") {
            if !api_base.trim().is_empty() {
                self.api_base = Some(api_base);
            }
        }
        if let Some(data_dir) = lookup("INSUREDOCS_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Some(verify) = lookup("INSUREDOCS_VERIFY_SESSION") {
            self.verify_session = parse_bool_env(&verify);
        }
    }

    /// Base address with any trailing slash removed.
    pub fn api_base_url(&self) -> String {
        self.api_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(session_dir)
    }
}
