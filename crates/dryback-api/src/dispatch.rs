//! 요청 분기 (로컬 재생 / 업스트림 중계).
//!
//! 모든 요청은 두 가지 의도 중 하나로 분류됩니다.
//!
//! - **LocalKline**: 메서드가 GET이고, 경로가 예약된 로컬 엔드포인트와 정확히 같으며,
//!   `symbol`과 `interval` 쿼리 파라미터가 모두 비어 있지 않은 경우.
//!   market은 경로로 결정됩니다 (쿼리 파라미터로 받지 않음).
//! - **PassThrough**: 그 외 모든 요청. 예약된 경로라도 파라미터가 부족하면 중계합니다.
//!
//! 로컬 재생 요청은 멱등이 아닙니다. 같은 요청을 반복하면 소진될 때까지
//! 매번 다음 레코드를 반환합니다.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use dryback_core::{GatewayError, GatewayResult, KlineRecord, LocalEndpointConfig, Resolution};
use dryback_exchange::ForwardRequest;
use serde::Deserialize;
use tracing::debug;

use crate::error::{error_response, ApiErrorResponse};
use crate::metrics::{record_replay, record_upstream};
use crate::state::AppState;

/// 로컬 캔들 요청 키.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub market: String,
    pub symbol: String,
    pub interval: String,
}

/// 요청 의도.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// 로컬 데이터 재생
    LocalKline(KlineQuery),
    /// 업스트림 중계
    PassThrough,
}

/// 응답을 만든 경로 종류.
///
/// 응답 extension으로 붙으며 HTTP metrics의 `route` 라벨이 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// 로컬 데이터 재생
    Local,
    /// 업스트림 중계
    Upstream,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Local => "local",
            RouteKind::Upstream => "upstream",
        }
    }
}

/// 로컬 캔들 요청에서 인식하는 쿼리 파라미터. 나머지(limit 등)는 무시합니다.
#[derive(Debug, Deserialize)]
struct KlineParams {
    symbol: Option<String>,
    interval: Option<String>,
}

/// 요청을 분류합니다.
pub fn classify(method: &Method, uri: &Uri, endpoints: &[LocalEndpointConfig]) -> Intent {
    if method != Method::GET {
        return Intent::PassThrough;
    }

    let Some(endpoint) = endpoints.iter().find(|e| e.path == uri.path()) else {
        return Intent::PassThrough;
    };

    let Ok(Query(params)) = Query::<KlineParams>::try_from_uri(uri) else {
        return Intent::PassThrough;
    };

    match (params.symbol, params.interval) {
        (Some(symbol), Some(interval)) if !symbol.is_empty() && !interval.is_empty() => {
            Intent::LocalKline(KlineQuery {
                market: endpoint.market.clone(),
                symbol,
                interval,
            })
        }
        _ => Intent::PassThrough,
    }
}

/// 라우터 fallback 핸들러.
///
/// 운영용 라우트(`/health`, `/metrics`, `/admin`)에 해당하지 않는 모든 요청을 처리합니다.
pub async fn dispatch_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let (kind, mut response) = match classify(&method, &uri, &state.endpoints) {
        Intent::LocalKline(query) => {
            let response = match serve_local(&state, &query).await {
                Ok(kline) => (StatusCode::OK, Json([kline])).into_response(),
                Err(e) => error_response(e, &method, &uri),
            };
            (RouteKind::Local, response)
        }
        Intent::PassThrough => (RouteKind::Upstream, pass_through(&state, request).await),
    };

    response.extensions_mut().insert(kind);
    response
}

/// 카탈로그 조회 후 다음 레코드를 읽습니다.
pub async fn serve_local(state: &AppState, query: &KlineQuery) -> GatewayResult<KlineRecord> {
    let KlineQuery {
        market,
        symbol,
        interval,
    } = query;

    let file_id = match state.catalog.resolve(market, symbol, interval) {
        Resolution::Found(file_id) => file_id,
        Resolution::NotFound(level) => {
            debug!(%market, %symbol, %interval, missing = %level, "Kline source not configured");
            record_replay(market, symbol, interval, "CONFIG_NOT_FOUND");
            return Err(GatewayError::ConfigNotFound {
                market: market.clone(),
                symbol: symbol.clone(),
                interval: interval.clone(),
            });
        }
    };

    match state.cursors.next_record(file_id.as_str()).await {
        Ok(kline) => {
            record_replay(market, symbol, interval, "served");
            Ok(kline)
        }
        Err(e) => {
            let err = GatewayError::from(e);
            record_replay(market, symbol, interval, err.code());
            Err(err)
        }
    }
}

/// 요청을 업스트림으로 전달하고 응답을 그대로 돌려줍니다.
///
/// 커서 잠금을 잡지 않은 상태에서 실행됩니다.
async fn pass_through(state: &AppState, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.server.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "Rejected request body");
            let error = ApiErrorResponse::new(
                "PAYLOAD_TOO_LARGE",
                format!("요청 본문이 {} 바이트를 초과합니다", state.server.max_body_bytes),
            )
            .with_request_info(&parts.method, &parts.uri);
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(error)).into_response();
        }
    };

    let forward = ForwardRequest::new(parts.method.clone(), parts.uri.path())
        .with_query(parts.uri.query())
        .with_headers(parts.headers)
        .with_body(body);

    let start = Instant::now();
    match state.upstream.forward(forward).await {
        Ok(upstream) => {
            record_upstream(
                parts.method.as_str(),
                upstream.status.as_str(),
                start.elapsed().as_secs_f64(),
            );

            let mut response = Response::new(Body::from(upstream.body));
            *response.status_mut() = upstream.status;
            *response.headers_mut() = upstream.headers;
            response
        }
        Err(e) => {
            let err = GatewayError::from(e);
            record_upstream(parts.method.as_str(), err.code(), start.elapsed().as_secs_f64());
            error_response(err, &parts.method, &parts.uri)
        }
    }
}
