//! 전체 라우터 조립.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::{access_log_layer, handle_panic, metrics_layer};
use crate::routes::create_gateway_router;
use crate::state::AppState;

/// CORS 레이어 생성.
///
/// 허용 origin이 설정되지 않으면 모든 origin을 허용합니다.
/// 중계 요청의 헤더(API 키 등)를 막지 않도록 메서드와 헤더는 모두 허용합니다.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        if parsed.is_empty() {
            warn!("cors_origins is set but contains no valid origins, allowing any");
            AllowOrigin::any()
        } else {
            info!("CORS configured with {} allowed origins", parsed.len());
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// 전체 라우터 생성.
///
/// `metrics_handle`이 없으면 `/metrics`를 노출하지 않습니다 (해당 경로도 중계됨).
pub fn create_router(state: Arc<AppState>, metrics_handle: Option<PrometheusHandle>) -> Router {
    let timeout = state.request_timeout();
    let cors = cors_layer(&state.cors_origins);

    let mut router = create_gateway_router().with_state(state);

    if let Some(handle) = metrics_handle {
        let metrics_router = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle);
        router = router.merge(metrics_router);
    }

    router
        .layer(middleware::from_fn(metrics_layer))
        .layer(middleware::from_fn(access_log_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
}
