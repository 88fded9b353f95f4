use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};
use wxlook_client::{WeatherClient, WeatherService};
use wxlook_config::AppConfig;
use wxlook_core::{is_valid_city_name, normalize_city, RecordSink, ANONYMOUS_USER};

mod render;

use render::form_encode;

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    service: RwLock<WeatherService>,
    config: Mutex<AppConfig>,
    config_path: PathBuf,
}

pub fn build_app(
    cfg: AppConfig,
    config_path: impl Into<PathBuf>,
    client: WeatherClient,
    sink: Box<dyn RecordSink>,
) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wxlook-cli");

    let requests_total = meter
        .u64_counter("wxlook_requests_total")
        .with_description("Total HTTP requests served")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        service: RwLock::new(WeatherService::new(client, sink)),
        config: Mutex::new(cfg),
        config_path: config_path.into(),
    });

    let router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/weather/:city", get(weather_page))
        .route("/api/v1/weather", get(api_weather))
        .route("/search", get(search_form).post(search_submit))
        .route("/settings", get(settings_form).post(settings_submit))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn root() -> Redirect {
    Redirect::to("/search")
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error = ?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

/// Page route: /weather/:city renders the record or an inline error.
async fn weather_page(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let lang = state.config.lock().await.language();

    // Redirect targets are form-encoded, so spaces arrive as '+'; percent
    // escapes were already decoded by the path extractor.
    let city = city.replace('+', " ");
    let city = city.trim();

    if city.is_empty() {
        return Html(render::error_page(render::no_city_msg(lang), lang)).into_response();
    }

    let service = state.service.read().await;
    match service.lookup(city, ANONYMOUS_USER).await {
        Ok(record) => {
            let units = service.client().units();
            let body = render::weather_page(&record, units, lang);
            // Freshness hint and invalidation tag for the fronting cache.
            let headers = [
                (header::CACHE_CONTROL, "public, max-age=1800".to_string()),
                (
                    HeaderName::from_static("x-cache-tag"),
                    format!("weather:{}", city.to_lowercase()),
                ),
            ];
            (headers, Html(body)).into_response()
        }
        Err(e) => {
            tracing::error!(city = %city, error = %e, "weather lookup returned no data");
            Html(render::error_page(&render::no_data_msg(lang, city), lang)).into_response()
        }
    }
}

#[derive(Deserialize)]
struct WeatherQuery {
    city: Option<String>,
}

/// Machine endpoint: /api/v1/weather?city=... returns the success envelope.
async fn api_weather(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WeatherQuery>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);

    let city = q.city.as_deref().map(str::trim).unwrap_or("");
    if city.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "city required"})),
        )
            .into_response();
    }

    let service = state.service.read().await;
    match service.lookup(city, ANONYMOUS_USER).await {
        Ok(record) => Json(serde_json::json!({
            "success": true,
            "data": record,
            "redirect_url": format!("/weather/{}", form_encode(city)),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(city = %city, error = %e, "weather lookup returned no data");
            Json(serde_json::json!({
                "success": false,
                "data": null,
                "redirect_url": null,
            }))
            .into_response()
        }
    }
}

async fn search_form(State(state): State<Arc<AppState>>) -> Html<String> {
    let lang = state.config.lock().await.language();
    Html(render::search_page(lang, None, ""))
}

#[derive(Deserialize)]
struct SearchForm {
    city: Option<String>,
}

/// Search form submit: validate, normalize whitespace, redirect to the page.
async fn search_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let lang = state.config.lock().await.language();

    let raw = form.city.unwrap_or_default();
    let city = raw.trim();

    if city.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::search_page(lang, Some(render::enter_city_msg(lang)), "")),
        )
            .into_response();
    }
    if !is_valid_city_name(city) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::search_page(
                lang,
                Some(render::invalid_city_msg(lang)),
                city,
            )),
        )
            .into_response();
    }

    let clean = normalize_city(city);
    tracing::info!(city = %clean, "search form redirect");
    Redirect::to(&format!("/weather/{}", form_encode(&clean))).into_response()
}

async fn settings_form(State(state): State<Arc<AppState>>) -> Html<String> {
    let cfg = state.config.lock().await;
    let lang = cfg.language();
    Html(render::settings_page(&cfg, lang, None, None))
}

#[derive(Deserialize)]
struct SettingsForm {
    api_key: String,
    units: String,
    language: String,
}

/// Settings submit: validate, persist the TOML file, swap the client.
async fn settings_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let mut cfg = state.config.lock().await;
    let lang = cfg.language();

    if let Err(e) = cfg.apply_settings(form.api_key.trim(), &form.units, &form.language) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::settings_page(&cfg, lang, None, Some(&e.to_string()))),
        )
            .into_response();
    }

    if let Err(e) = cfg.save(&state.config_path) {
        tracing::error!(error = %e, path = %state.config_path.display(), "failed to persist configuration");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render::settings_page(
                &cfg,
                lang,
                None,
                Some(render::save_failed_msg(lang)),
            )),
        )
            .into_response();
    }

    {
        let mut service = state.service.write().await;
        let client = service.client().reconfigured(&cfg);
        service.set_client(client);
    }

    let lang = cfg.language();
    tracing::info!(units = %cfg.units(), lang = %lang, "configuration saved");
    Html(render::settings_page(
        &cfg,
        lang,
        Some(render::settings_saved_msg(lang)),
        None,
    ))
    .into_response()
}
