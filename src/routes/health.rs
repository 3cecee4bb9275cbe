use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::analysis::{analyze, reference::reference_face};
use crate::constants::READINESS_MIN_SCORE;
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.uptime_secs(),
        "store": {
            "healthy": state.store().ping().is_ok(),
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// 用内置参考脸跑一遍完整流水线，评分表或几何计算被改坏时这里会失败
pub async fn readiness() -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let result = analyze(&reference_face());
    let latency_us = start.elapsed().as_micros() as u64;

    let ready = result.overall_score.is_finite() && result.overall_score >= READINESS_MIN_SCORE;
    if !ready {
        tracing::error!(
            overall_score = result.overall_score,
            rarity = %result.rarity,
            "Reference face failed readiness check"
        );
        return Err(AppError::service_unavailable(
            "NOT_READY",
            "analysis pipeline self-check failed",
        ));
    }

    Ok(Json(serde_json::json!({
        "ready": true,
        "referenceScore": result.overall_score,
        "referenceRarity": result.rarity,
        "latencyUs": latency_us,
    })))
}

pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let ping = state.store().ping();
    let latency_us = start.elapsed().as_micros() as u64;

    let status = if ping.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    if let Err(e) = &ping {
        tracing::error!(error = %e, "Store health check failed");
    }

    (
        status,
        Json(serde_json::json!({
            "healthy": ping.is_ok(),
            "latencyUs": latency_us,
            "schemaVersion": ping.ok(),
            "analysisCount": state.store().count_analyses(),
        })),
    )
}
