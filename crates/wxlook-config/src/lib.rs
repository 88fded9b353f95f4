//! Service configuration: TOML file, accessor defaults, and the two-tier
//! API-key resolution chain (config store first, then process environment).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use wxlook_core::{Language, Units};

/// Environment variable consulted when no key is stored in configuration
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Environment variable naming the configuration file path
pub const CONFIG_PATH_ENV: &str = "WXLOOK_CONFIG";

/// Expected length of an OpenWeatherMap API key
pub const API_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub units: Option<Units>,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SinksConfig {
    /// Path of the SQLite log database
    pub sqlite: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub weather: Option<WeatherConfig>,
    pub http: Option<HttpConfig>,
    pub sinks: Option<SinksConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Could not serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Config,
    Environment,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeySource::Config => "config",
            KeySource::Environment => "environment",
        })
    }
}

/// Settings-form rejections
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("API key is required.")]
    MissingKey,
    #[error("OpenWeatherMap API key should be {API_KEY_LEN} characters long.")]
    BadKeyLength,
    #[error("{0}")]
    BadSelection(String),
}

impl AppConfig {
    /// Load configuration from the WXLOOK_CONFIG path (TOML) if present,
    /// with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_path())
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Write configuration as pretty TOML, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    /// Get HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    /// Path of the SQLite log database (default wxlook.db)
    pub fn sqlite_path(&self) -> String {
        self.sinks
            .as_ref()
            .and_then(|s| s.sqlite.clone())
            .unwrap_or_else(|| "wxlook.db".to_string())
    }

    pub fn units(&self) -> Units {
        self.weather
            .as_ref()
            .and_then(|w| w.units)
            .unwrap_or_default()
    }

    pub fn language(&self) -> Language {
        self.weather
            .as_ref()
            .and_then(|w| w.language)
            .unwrap_or_default()
    }

    /// Stored API key; an empty string counts as unset
    pub fn api_key(&self) -> Option<&str> {
        self.weather
            .as_ref()
            .and_then(|w| w.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Resolve the API key through the ordered source chain.
    pub fn resolve_api_key(&self) -> Option<(String, KeySource)> {
        resolve_api_key_from(self.api_key())
    }

    /// Validated settings-form write into the `[weather]` section.
    ///
    /// The key is required; unit/language strings must parse through the
    /// enums. Nothing is modified on rejection.
    pub fn apply_settings(
        &mut self,
        api_key: &str,
        units: &str,
        language: &str,
    ) -> Result<(), SettingsError> {
        if api_key.is_empty() {
            return Err(SettingsError::MissingKey);
        }
        validate_api_key(api_key)?;
        let units = Units::try_from(units)
            .map_err(|e| SettingsError::BadSelection(e.to_string()))?;
        let language = Language::try_from(language)
            .map_err(|e| SettingsError::BadSelection(e.to_string()))?;

        let weather = self.weather.get_or_insert_with(WeatherConfig::default);
        weather.api_key = Some(api_key.to_string());
        weather.units = Some(units);
        weather.language = Some(language);
        Ok(())
    }
}

/// Configuration file path from WXLOOK_CONFIG (default config.toml)
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string())
}

/// Ordered API-key source chain: explicit config value, then environment.
///
/// Empty strings are treated as unset at both tiers.
pub fn resolve_api_key_from(config_key: Option<&str>) -> Option<(String, KeySource)> {
    if let Some(key) = config_key.filter(|k| !k.is_empty()) {
        return Some((key.to_string(), KeySource::Config));
    }
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .map(|k| (k, KeySource::Environment))
}

/// A non-empty key must be exactly [`API_KEY_LEN`] characters.
pub fn validate_api_key(key: &str) -> Result<(), SettingsError> {
    if !key.is_empty() && key.chars().count() != API_KEY_LEN {
        return Err(SettingsError::BadKeyLength);
    }
    Ok(())
}
