//! HTTP trigger surface for source synchronization.
//!
//! # Responsibility
//! - Expose one bodyless POST trigger per source family.
//! - Run the blocking sync pipeline off the async runtime.
//! - Report coarse success or failure; per-event detail stays in the logs.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info};
use meetsync_core::{init_logging, run_selector, AppConfig};
use serde::Serialize;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

const BIND_ENV_KEY: &str = "MEETSYNC_BIND";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Serialize)]
struct TriggerReply {
    status: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("meetsync-api: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("meetsync-api: logging setup failed: {err}");
        return ExitCode::FAILURE;
    }

    let bind = std::env::var(BIND_ENV_KEY)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("meetsync-api: invalid bind address `{bind}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(config);
    let app = Router::new()
        .route("/frontendmu", post(trigger_frontendmu))
        .route("/cloudnativemu", post(trigger_cloudnativemu))
        .route("/calendar", post(trigger_calendar))
        .layer(Extension(state));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("meetsync-api: failed to bind `{addr}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("event=api_start module=api status=ok bind={addr}");
    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("meetsync-api: server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn trigger_frontendmu(
    Extension(config): Extension<Arc<AppConfig>>,
) -> (StatusCode, Json<TriggerReply>) {
    run_sync(config, "frontendmu".to_string()).await
}

async fn trigger_cloudnativemu(
    Extension(config): Extension<Arc<AppConfig>>,
) -> (StatusCode, Json<TriggerReply>) {
    run_sync(config, "cnmu".to_string()).await
}

/// Syncs whatever the configured community selector names, so one
/// deployment can serve either a single calendar or all of them.
async fn trigger_calendar(
    Extension(config): Extension<Arc<AppConfig>>,
) -> (StatusCode, Json<TriggerReply>) {
    let selector = config.community.clone();
    run_sync(config, selector).await
}

/// Runs the pipeline on the blocking pool and folds the outcome into the
/// coarse `{"status": ...}` reply contract.
async fn run_sync(config: Arc<AppConfig>, selector: String) -> (StatusCode, Json<TriggerReply>) {
    let joined =
        tokio::task::spawn_blocking(move || run_selector(&config, &selector)).await;

    let detail = match joined {
        Ok(Ok(summary)) if summary.is_success() => {
            return (
                StatusCode::OK,
                Json(TriggerReply {
                    status: "success".to_string(),
                }),
            );
        }
        Ok(Ok(summary)) => summary
            .failures
            .first()
            .map(|failure| failure.error.to_string())
            .unwrap_or_else(|| "sync failed".to_string()),
        Ok(Err(err)) => err.to_string(),
        Err(_) => "sync task panicked".to_string(),
    };

    error!("event=api_trigger module=api status=error detail={detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(TriggerReply { status: detail }),
    )
}
