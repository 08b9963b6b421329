use crate::config::Config;
use crate::conversion::ConversionService;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use oga2mp3_av::{FfmpegTranscoder, Transcoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod routes_convert;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub conversions: Arc<ConversionService>,
}

impl AppContext {
    /// Build the context from an explicit config and transcoder
    pub fn new(config: Config, transcoder: Arc<dyn Transcoder>) -> Self {
        let conversions = Arc::new(ConversionService::new(transcoder, &config.conversion));
        Self {
            config: Arc::new(config),
            conversions,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.server.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route(
            "/convert",
            post(routes_convert::convert).fallback(routes_convert::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Resolve ffmpeg for the given config.
///
/// A missing ffmpeg is not fatal: the server still starts and each request
/// fails with the spawn error until ffmpeg is installed.
pub fn ffmpeg_transcoder(config: &Config) -> FfmpegTranscoder {
    let options = config.conversion.mp3_options();
    match FfmpegTranscoder::discover(config.tools.ffmpeg_path.as_deref(), options) {
        Ok(transcoder) => {
            tracing::info!("Using ffmpeg at {}", transcoder.program().display());
            transcoder
        }
        Err(e) => {
            tracing::warn!("{e}; conversions will fail until ffmpeg is installed");
            FfmpegTranscoder::new(oga2mp3_av::tools::FFMPEG.into(), options)
        }
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let transcoder = Arc::new(ffmpeg_transcoder(&config));
    start_server_with_transcoder(config, transcoder).await
}

/// Start the HTTP server with an explicit transcoder
pub async fn start_server_with_transcoder(
    config: Config,
    transcoder: Arc<dyn Transcoder>,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(config, transcoder);

    // Fail fast if the scratch directory cannot be created
    let temp_dir = ctx.conversions.temp_dir();
    tokio::fs::create_dir_all(temp_dir)
        .await
        .with_context(|| format!("Failed to create temp directory {:?}", temp_dir))?;

    tracing::info!(
        "Scratch directory {:?}, up to {} concurrent transcodes via {}, timeout {}s",
        temp_dir,
        ctx.conversions.max_concurrent(),
        ctx.conversions.transcoder_name(),
        ctx.config.conversion.timeout_secs
    );

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
