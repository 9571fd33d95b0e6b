//! 업스트림 에러 타입.

use dryback_core::GatewayError;
use thiserror::Error;

/// 업스트림 중계 에러.
///
/// 업스트림이 응답을 돌려준 경우(상태 코드와 무관)는 에러가 아닙니다.
/// 응답 자체를 받지 못한 경우만 여기에 해당합니다.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 요청을 구성할 수 없음 (잘못된 URL 등)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// 타임아웃 에러인지 확인.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout(_))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() {
            ExchangeError::NetworkError(err.to_string())
        } else if err.is_builder() {
            ExchangeError::InvalidRequest(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<ExchangeError> for GatewayError {
    fn from(err: ExchangeError) -> Self {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout(err.to_string())
        } else {
            GatewayError::UpstreamUnavailable(err.to_string())
        }
    }
}
