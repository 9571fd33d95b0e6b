//! 헬스 체크 endpoint.
//!
//! `/health`는 liveness, `/health/ready`는 카탈로그/커서/업스트림 상태를 포함한 readiness입니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded")
    pub status: String,

    /// 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 데이터 소스 카탈로그
    pub catalog: ComponentStatus,

    /// 재생 커서 저장소
    pub cursors: ComponentStatus,

    /// 업스트림 거래소
    pub upstream: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// 상태 ("up" | "empty")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// 정보 포함 정상 상태.
    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }

    /// 설정된 항목이 없는 상태.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            status: "empty".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 카탈로그가 비어 있으면 모든 요청이 중계되므로 "degraded"로 보고합니다.
/// 업스트림 연결은 확인하지 않습니다 (요청마다 새로 연결 여부가 드러남).
///
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let catalog_status = if state.catalog.is_empty() {
        ComponentStatus::empty("no kline sources configured")
    } else {
        ComponentStatus::up_with_info(format!("{} kline sources", state.catalog.len()))
    };

    let overall_status = if state.catalog.is_empty() {
        "degraded"
    } else {
        "healthy"
    };

    let cursors_status = ComponentStatus::up_with_info(format!(
        "{} open cursors",
        state.cursors.open_cursors().await
    ));

    let upstream_status = ComponentStatus::up_with_info(format!(
        "{} ({})",
        state.upstream.name(),
        state.upstream.base_url()
    ));

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            catalog: catalog_status,
            cursors: cursors_status,
            upstream: upstream_status,
        },
    };

    (StatusCode::OK, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
