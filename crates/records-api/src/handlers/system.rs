//! 根路径与探针

use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::{
    dto::{AppInfo, HealthResponse},
    state::AppState,
};

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<AppInfo> {
    Json(AppInfo {
        name: state.api.app_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "online".to_string(),
    })
}

/// 存活探针，不访问存储
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// 就绪探针，存储不可用时返回 503
///
/// GET /ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                storage: Some("ok".to_string()),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "存储探测失败");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    storage: Some("fail".to_string()),
                }),
            )
        }
    }
}
