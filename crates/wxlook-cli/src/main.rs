use std::net::SocketAddr;
use tokio::net::TcpListener;
use wxlook_core::RecordSink;

#[tokio::main]
async fn main() {
    // Observability
    wxlook_obs::init("wxlook");

    // Config
    let config_path = wxlook_config::config_path();
    let cfg = wxlook_config::AppConfig::load().unwrap_or_default();
    let http_bind = cfg.http_bind();

    // Outbound client and the record log
    let client = wxlook_client::WeatherClient::from_config(&cfg);
    let sink: Box<dyn RecordSink> = match wxlook_sinks::SqliteSink::new(cfg.sqlite_path()) {
        Ok(s) => Box::new(s),
        Err(e) => {
            tracing::error!(error = ?e, path = %cfg.sqlite_path(), "failed to open weather log");
            std::process::exit(1);
        }
    };

    // Build app and state
    let (app, state) = wxlook_cli::build_app(cfg, &config_path, client, sink);

    // Start HTTP server
    let addr: SocketAddr = http_bind.parse().expect("Invalid HTTP bind address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");

    // Mark ready just before serving
    wxlook_cli::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.expect("server error");
}
