//! Site API server - main entry point.
//!
//! This binary serves the AI endpoints behind the Tioga AI marketing site:
//! the streaming chat assistant, contact-form inquiry classification, the
//! interactive demos, and file text extraction.

use anyhow::{Context, Result};
use chrono::Local;
use tioga_api::{build_router, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::from_env()?;

    if config.email.is_none() {
        tracing::warn!("email delivery not configured; inquiry notifications are disabled");
    }

    let http_client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client")?;

    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(AppState::new(&config, http_client));

    tracing::info!("Starting Tioga AI site API on {}", addr);
    tracing::info!("Model: {}", config.anthropic.model);
    tracing::info!(
        "Endpoints: /api/chat, /api/classify, /api/demo-document, /api/demo-email, \
         /api/invoice-parse, /api/extract-text, /api/mcp-demo"
    );

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with local timezone.
///
/// Default filter: info level for most crates, debug for this crate. Noisy
/// HTTP library logs are suppressed regardless of the RUST_LOG setting,
/// since a plain "RUST_LOG=debug" would otherwise let them through.
fn init_tracing() {
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tioga_api=debug".to_string());
    let filter_str = format!("{},hyper=warn,h2=warn,reqwest=warn", base_filter);
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    if std::env::var("NO_COLOR").is_ok() {
        // Disable ANSI colors for file logging
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_timer(LocalTime))
            .init();
    }
}
