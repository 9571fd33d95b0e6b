//! 게이트웨이 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/admin/cursors` - 재생 커서 조회/되감기/닫기
//! - 그 외 모든 경로 - [`dispatch_handler`] (로컬 재생 또는 업스트림 중계)
//!
//! `/metrics`는 별도 상태(PrometheusHandle)를 쓰므로 [`crate::app`]에서 합칩니다.

pub mod admin;
pub mod health;

pub use admin::{admin_router, CursorActionResponse, CursorKeyQuery, CursorsResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::Router;
use std::sync::Arc;

use crate::dispatch::dispatch_handler;
use crate::state::AppState;

/// 게이트웨이 라우터 생성.
///
/// 운영용 라우트에 해당하지 않는 요청은 모두 fallback인 분기 핸들러로 갑니다.
pub fn create_gateway_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/admin", admin_router())
        .fallback(dispatch_handler)
}
