//! HTTP 요청 metrics middleware.
//!
//! 응답에 붙은 [`RouteKind`]로 로컬 재생, 업스트림 중계, 운영용 라우트를 구분해 기록합니다.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::dispatch::RouteKind;
use crate::metrics::{normalize_path, record_http};

/// 운영용 라우트(`/health`, `/metrics`, `/admin`) 라벨.
const OPERATIONAL_ROUTE: &str = "operational";

/// 완료된 요청마다 `http_requests_total`과 `http_request_duration_seconds`를 기록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let route = response
        .extensions()
        .get::<RouteKind>()
        .map_or(OPERATIONAL_ROUTE, |kind| kind.as_str());
    record_http(
        method.as_str(),
        &path,
        route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
