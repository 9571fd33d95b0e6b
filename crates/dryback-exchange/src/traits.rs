//! 업스트림 trait 정의.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::ExchangeError;

/// 업스트림 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 업스트림으로 전달할 요청.
///
/// 경로와 쿼리 문자열은 받은 그대로 유지합니다 (재인코딩하지 않음).
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// HTTP 메서드
    pub method: Method,
    /// 요청 경로 (예: "/api/v3/ticker/price")
    pub path: String,
    /// 원본 쿼리 문자열 ('?' 제외)
    pub query: Option<String>,
    /// 요청 헤더
    pub headers: HeaderMap,
    /// 요청 본문
    pub body: Bytes,
}

impl ForwardRequest {
    /// 빈 헤더/본문으로 새 요청을 생성합니다.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 쿼리 문자열을 설정합니다.
    pub fn with_query(mut self, query: Option<impl Into<String>>) -> Self {
        self.query = query.map(Into::into);
        self
    }

    /// 헤더를 설정합니다.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// 본문을 설정합니다.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// `path?query` 형식의 대상 문자열.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// 업스트림 응답.
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    /// 상태 코드 (그대로 중계)
    pub status: StatusCode,
    /// 응답 헤더 (hop-by-hop 제외)
    pub headers: HeaderMap,
    /// 응답 본문 (바이트 그대로)
    pub body: Bytes,
}

/// 업스트림 거래소 인터페이스.
///
/// 응답을 받았다면 상태 코드와 관계없이 `Ok`를 반환합니다.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// 업스트림 이름 반환.
    fn name(&self) -> &str;

    /// 기본 URL 반환.
    fn base_url(&self) -> &str;

    /// 요청을 전달하고 응답을 받습니다.
    async fn forward(&self, request: ForwardRequest) -> ExchangeResult<ForwardResponse>;
}
