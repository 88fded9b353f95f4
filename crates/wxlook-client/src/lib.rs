//! Client for the OpenWeatherMap current-weather endpoint.
//!
//! `WeatherClient` turns a free-text city name into a [`WeatherRecord`] or a
//! [`FetchError`]; `WeatherService` additionally appends every successful
//! record to the configured log sink.

mod response;
mod service;

pub use service::WeatherService;

use chrono::Utc;
use wxlook_config::{resolve_api_key_from, AppConfig};
use wxlook_core::{Language, Units, WeatherRecord};

use crate::response::CurrentConditions;

/// Upstream current-weather endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Expected lookup failures, normalized to "no data" at the HTTP surface.
///
/// The variant is kept for logging only. A reachable upstream returning an
/// error status and an unreachable upstream both land in `Transport`; the
/// service deliberately does not retry either.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No API key resolvable from configuration or environment; no request
    /// was attempted
    #[error("no API key configured")]
    Unauthenticated,

    /// Connect/DNS/request-level failure, or a non-2xx upstream status
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// Body that is not valid JSON, or valid JSON without a usable city name
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    config_api_key: Option<String>,
    units: Units,
    language: Language,
}

impl WeatherClient {
    pub fn new(config_api_key: Option<String>, units: Units, language: Language) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            config_api_key,
            units,
            language,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.api_key().map(str::to_owned), cfg.units(), cfg.language())
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rebuild the request parameters from config, keeping the HTTP client
    /// and endpoint. Used after a settings save.
    pub fn reconfigured(&self, cfg: &AppConfig) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            config_api_key: cfg.api_key().map(str::to_owned),
            units: cfg.units(),
            language: cfg.language(),
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Fetch current weather for a city.
    ///
    /// One GET, no retry, client-default timeout. The key is resolved through
    /// the configuration chain on every call, so an environment-provided key
    /// takes effect without a restart.
    pub async fn fetch(&self, city: &str, user_id: i64) -> Result<WeatherRecord, FetchError> {
        let Some((api_key, source)) = resolve_api_key_from(self.config_api_key.as_deref()) else {
            tracing::error!("no API key resolvable from configuration or environment");
            return Err(FetchError::Unauthenticated);
        };
        // Never the key itself, only its provenance and length.
        tracing::debug!(
            source = %source,
            key_len = api_key.chars().count(),
            "API key resolved"
        );

        tracing::info!(
            city = %city,
            units = %self.units,
            lang = %self.language,
            "requesting current weather"
        );

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(city = %city, error = %e, "weather request failed");
                FetchError::Transport(e.to_string())
            })?;

        let status = res.status();
        tracing::debug!(status = %status, "upstream response received");

        let body = res.text().await.map_err(|e| {
            tracing::error!(city = %city, error = %e, "failed to read upstream body");
            FetchError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!(city = %city, status = %status, "upstream returned error status");
            return Err(FetchError::Transport(format!(
                "status {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: CurrentConditions = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(city = %city, error = %e, "invalid weather payload");
            FetchError::MalformedResponse(e.to_string())
        })?;
        if parsed.name.is_empty() {
            tracing::warn!(city = %city, "upstream response missing city name");
            return Err(FetchError::MalformedResponse(
                "response has no city name".to_string(),
            ));
        }

        let record = parsed.into_record(user_id, Utc::now().timestamp());
        tracing::debug!(city = %record.city, "weather record assembled");
        Ok(record)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= MAX)
            .last()
            .map_or(0, |(i, _)| i);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
