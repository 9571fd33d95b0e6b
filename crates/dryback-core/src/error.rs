//! 게이트웨이 에러 타입.
//!
//! 요청 처리 중 발생하는 모든 실패는 이 분류로 수렴한 뒤
//! 라우터 경계에서 HTTP 응답으로 변환됩니다.

use thiserror::Error;

/// 게이트웨이 에러.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// (market, symbol, interval) 조합이 설정에 없음
    #[error("설정을 찾을 수 없음: {market}/{symbol}/{interval}")]
    ConfigNotFound {
        market: String,
        symbol: String,
        interval: String,
    },

    /// 데이터 파일이 존재하지 않음
    #[error("데이터 파일 없음: {0}")]
    SourceMissing(String),

    /// 더 이상 읽을 레코드가 없음
    #[error("데이터 소진: {0}")]
    Exhausted(String),

    /// 레코드 형식 오류
    #[error("레코드 디코딩 실패 ({file_id} #{offset}): {reason}")]
    Decode {
        file_id: String,
        offset: u64,
        reason: String,
    },

    /// 업스트림 연결 실패
    #[error("업스트림 연결 실패: {0}")]
    UpstreamUnavailable(String),

    /// 업스트림 응답 타임아웃
    #[error("업스트림 타임아웃: {0}")]
    UpstreamTimeout(String),

    /// 설정 에러 (시작 시점)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 게이트웨이 작업을 위한 Result 타입.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// 응답 본문에 들어가는 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            GatewayError::SourceMissing(_) => "SOURCE_MISSING",
            GatewayError::Exhausted(_) => "NO_MORE_DATA",
            GatewayError::Decode { .. } => "DECODE_ERROR",
            GatewayError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            GatewayError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 요청 내용에 의해 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::ConfigNotFound { .. })
    }

    /// 로컬 데이터 재생 경로의 not-found 계열 에러인지 확인합니다.
    pub fn is_replay_miss(&self) -> bool {
        matches!(
            self,
            GatewayError::SourceMissing(_)
                | GatewayError::Exhausted(_)
                | GatewayError::Decode { .. }
        )
    }

    /// 업스트림 경로 에러인지 확인합니다.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GatewayError::UpstreamUnavailable(_) | GatewayError::UpstreamTimeout(_)
        )
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}
