//! User configuration and filesystem locations.
//!
//! Everything is optional. A missing file means defaults; a file that fails to
//! parse is logged and also means defaults. Config never prevents startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use critique_core::api::{ApiFlavor, ClientOptions};
use serde::Deserialize;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_THEME: &str = "catppuccin-mocha";

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server_url: String,
    pub theme: String,
    pub api_flavor: ApiFlavor,
    /// Ping the backend before each submission. Always on for the legacy flavor.
    pub preflight_ping: bool,
    pub request_timeout_secs: Option<u64>,
    /// Tags offered by the response-language selector, in cycle order.
    pub response_languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            theme: DEFAULT_THEME.to_owned(),
            api_flavor: ApiFlavor::Modern,
            preflight_ping: false,
            request_timeout_secs: None,
            response_languages: ["en", "ru", "de", "fr", "es"].map(str::to_owned).to_vec(),
        }
    }
}

impl Config {
    /// Parses TOML text. An empty `response_languages` list falls back to the default.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(raw)?;
        if config.response_languages.is_empty() {
            config.response_languages = Config::default().response_languages;
        }
        Ok(config)
    }

    /// Loads `path`, falling back to defaults on any error.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(path = %path.display(), %e, "no config file, using defaults");
                return Self::default();
            }
        };
        match Self::from_toml(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "config parse error, using defaults");
                Self::default()
            }
        }
    }

    pub fn preflight_ping(&self) -> bool {
        self.preflight_ping || self.api_flavor == ApiFlavor::Legacy
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.server_url.clone(),
            flavor: self.api_flavor,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// `$<var>` if set and non-empty, else `$HOME/<fallback>`, else `./<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(fallback))
        })
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// `$XDG_CONFIG_HOME/critique/config.toml`.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("critique").join("config.toml")
}

/// `$XDG_DATA_HOME/critique/critique.db`, the preference store.
pub fn store_path() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share").join("critique").join("critique.db")
}

/// `$XDG_STATE_HOME/critique/critique.log`.
pub fn log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("critique").join("critique.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn all_keys_parse() {
        let config = Config::from_toml(
            r#"
            server_url = "http://review.internal:8080"
            theme = "dark"
            api_flavor = "legacy"
            request_timeout_secs = 90
            response_languages = ["ru", "en"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server_url, "http://review.internal:8080");
        assert_eq!(config.theme, "dark");
        assert_eq!(config.api_flavor, ApiFlavor::Legacy);
        assert!(config.preflight_ping(), "legacy implies ping");
        assert_eq!(config.client_options().request_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.response_languages, vec!["ru", "en"]);
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(Config::from_toml("sever_url = \"typo\"").is_err());
    }

    #[test]
    fn empty_language_list_falls_back() {
        let config = Config::from_toml("response_languages = []").unwrap();
        assert_eq!(config.response_languages, Config::default().response_languages);
    }

    #[test]
    fn unreadable_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = [").unwrap();
        assert_eq!(Config::load(&path), Config::default());
        assert_eq!(Config::load(&dir.path().join("missing.toml")), Config::default());
    }
}
