//! 통합 API 에러 응답 타입.
//!
//! 게이트웨이가 직접 만드는 모든 에러 응답은 이 형식을 사용합니다.
//! 업스트림이 돌려준 에러 응답은 손대지 않고 그대로 중계합니다.

use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use dryback_core::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

/// 내부 에러를 숨길 때 사용하는 메시지.
const INTERNAL_MESSAGE: &str = "내부 서버 에러가 발생했습니다";

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NO_MORE_DATA",
///   "message": "데이터 소진: BTCUSDT_1m.csv",
///   "method": "GET",
///   "path": "/api/v3/klines"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "CONFIG_NOT_FOUND", "NO_MORE_DATA")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// HTTP 메서드 (GET, POST 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 요청 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    /// 에러 응답 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    /// 상세 정보를 추가합니다.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// 요청 정보(메서드, 경로)를 추가합니다.
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(uri.path().to_string());
        self
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

impl From<&GatewayError> for ApiErrorResponse {
    fn from(err: &GatewayError) -> Self {
        match err {
            // 내부 사정은 로그에만 남긴다
            GatewayError::Internal(_) | GatewayError::Config(_) => {
                ApiErrorResponse::new(err.code(), INTERNAL_MESSAGE)
            }
            GatewayError::Decode { offset, .. } => {
                ApiErrorResponse::new(err.code(), err.to_string())
                    .with_details(serde_json::json!({ "offset": offset }))
            }
            _ => ApiErrorResponse::new(err.code(), err.to_string()),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 게이트웨이 에러의 HTTP 상태 코드.
pub fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::ConfigNotFound { .. } => StatusCode::BAD_REQUEST,
        GatewayError::SourceMissing(_)
        | GatewayError::Exhausted(_)
        | GatewayError::Decode { .. } => StatusCode::NOT_FOUND,
        GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Config(_) | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 게이트웨이 에러를 로그에 남기고 API 에러 응답으로 변환합니다.
pub fn into_api_error(
    err: GatewayError,
    method: &Method,
    uri: &Uri,
) -> (StatusCode, Json<ApiErrorResponse>) {
    let path = uri.path();

    if err.is_upstream() {
        warn!(%method, path, error = %err, "Upstream request failed");
    } else if err.is_replay_miss() {
        debug!(%method, path, code = err.code(), error = %err, "Kline replay missed");
    } else if err.is_client_error() {
        debug!(%method, path, code = err.code(), "Request rejected");
    } else {
        error!(%method, path, error = %err, "Request failed");
    }

    let body = ApiErrorResponse::from(&err).with_request_info(method, uri);
    (status_for(&err), Json(body))
}

/// [`into_api_error`]의 결과를 응답으로 변환합니다.
pub fn error_response(err: GatewayError, method: &Method, uri: &Uri) -> Response {
    into_api_error(err, method, uri).into_response()
}
