//! Binance REST 업스트림.
//!
//! 로컬에서 재생하지 않는 모든 요청을 Binance로 그대로 전달합니다.
//! 서명, 재시도, 본문 해석은 하지 않습니다.

use async_trait::async_trait;
use dryback_core::UpstreamConfig;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, warn};

use crate::headers::filter_headers;
use crate::traits::{ExchangeResult, ForwardRequest, ForwardResponse, Upstream};
use crate::ExchangeError;

/// Binance REST 업스트림 클라이언트.
pub struct BinanceUpstream {
    base_url: String,
    client: Client,
}

impl BinanceUpstream {
    /// 새 업스트림 클라이언트 생성.
    ///
    /// 리다이렉트는 따라가지 않고 클라이언트에게 그대로 전달합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: &UpstreamConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, request: &ForwardRequest) -> String {
        format!("{}{}", self.base_url, request.path_and_query())
    }
}

#[async_trait]
impl Upstream for BinanceUpstream {
    fn name(&self) -> &str {
        "binance"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn forward(&self, request: ForwardRequest) -> ExchangeResult<ForwardResponse> {
        let url = self.url(&request);
        debug!(method = %request.method, url = %url, "Forwarding request upstream");

        let ForwardRequest {
            method,
            headers,
            body,
            ..
        } = request;

        let mut builder = self
            .client
            .request(method, &url)
            .headers(filter_headers(&headers));
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Upstream request failed");
            ExchangeError::from(e)
        })?;

        let status = response.status();
        let headers = filter_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read upstream body");
            ExchangeError::from(e)
        })?;

        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Upstream responded");

        Ok(ForwardResponse {
            status,
            headers,
            body,
        })
    }
}
