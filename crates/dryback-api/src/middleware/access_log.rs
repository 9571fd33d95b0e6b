//! 요청 기록 middleware.
//!
//! 요청마다 한 건의 구조화 로그를 `dryback::access` 타겟으로 남깁니다.
//! 로그 출력 실패는 응답에 영향을 주지 않습니다.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use dryback_core::ACCESS_LOG_TARGET;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::RouteKind;

/// 요청 기록 미들웨어 레이어.
///
/// 요청 ID, 클라이언트 주소, 경로, 처리 경로 종류, 상태 코드, 처리 시간 등을 기록합니다.
/// 5xx 응답은 warn 레벨로 기록합니다.
pub async fn access_log_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let query = uri.query().unwrap_or("");
    let path = uri.path();
    let route = response
        .extensions()
        .get::<RouteKind>()
        .map_or("operational", |kind| kind.as_str());

    if response.status().is_server_error() {
        warn!(
            target: ACCESS_LOG_TARGET,
            %request_id, %client, %method, path, query, route, status, elapsed_ms, %user_agent,
            "Request completed with server error"
        );
    } else {
        info!(
            target: ACCESS_LOG_TARGET,
            %request_id, %client, %method, path, query, route, status, elapsed_ms, %user_agent,
            "Request completed"
        );
    }

    response
}
