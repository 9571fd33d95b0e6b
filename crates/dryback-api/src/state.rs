//! 애플리케이션 상태 관리.
//!
//! 모든 핸들러에서 공유하는 상태를 정의합니다.
//! 커서 저장소는 전역 변수가 아닌 이 상태에 주입된 인스턴스입니다.

use std::sync::Arc;
use std::time::Duration;

use dryback_core::{AppConfig, LocalEndpointConfig, ServerConfig, SourceCatalog};
use dryback_data::RowCursorStore;
use dryback_exchange::Upstream;

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// (market, symbol, interval) → 데이터 파일 카탈로그 (시작 시 로드, 불변)
    pub catalog: Arc<SourceCatalog>,

    /// 데이터 파일별 재생 커서
    pub cursors: Arc<RowCursorStore>,

    /// 업스트림 거래소
    pub upstream: Arc<dyn Upstream>,

    /// 로컬 재생 엔드포인트 목록
    pub endpoints: Vec<LocalEndpointConfig>,

    /// 서버 설정 (타임아웃, 본문 크기 제한)
    pub server: ServerConfig,

    /// CORS 허용 origin (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// 버전 정보
    pub version: String,
}

impl AppState {
    /// 기본 엔드포인트/서버 설정으로 새 상태를 생성합니다.
    pub fn new(
        catalog: SourceCatalog,
        cursors: Arc<RowCursorStore>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        let defaults = AppConfig::default();
        Self {
            catalog: Arc::new(catalog),
            cursors,
            upstream,
            endpoints: defaults.endpoints,
            server: defaults.server,
            cors_origins: defaults.cors_origins,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 애플리케이션 설정으로 상태를 생성합니다.
    pub fn from_config(
        config: &AppConfig,
        catalog: SourceCatalog,
        cursors: Arc<RowCursorStore>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self::new(catalog, cursors, upstream)
            .with_endpoints(config.endpoints.clone())
            .with_server_config(config.server.clone())
            .with_cors_origins(config.cors_origins.clone())
    }

    /// 로컬 재생 엔드포인트를 설정합니다.
    pub fn with_endpoints(mut self, endpoints: Vec<LocalEndpointConfig>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// 서버 설정을 지정합니다.
    pub fn with_server_config(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// CORS 허용 origin을 설정합니다.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 요청 전체 타임아웃.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

/// 테스트용 상태 생성.
///
/// 업스트림은 받은 요청을 본문에 그대로 적어 돌려주는 스텁입니다.
#[cfg(test)]
pub fn create_test_state(data_dir: &std::path::Path, catalog: SourceCatalog) -> AppState {
    AppState::new(
        catalog,
        Arc::new(RowCursorStore::new(data_dir)),
        Arc::new(test_support::EchoUpstream),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use dryback_exchange::{ExchangeResult, ForwardRequest, ForwardResponse, Upstream};

    /// 요청 라인을 본문으로 돌려주는 업스트림 스텁.
    pub struct EchoUpstream;

    #[async_trait]
    impl Upstream for EchoUpstream {
        fn name(&self) -> &str {
            "echo"
        }

        fn base_url(&self) -> &str {
            "http://echo.invalid"
        }

        async fn forward(&self, request: ForwardRequest) -> ExchangeResult<ForwardResponse> {
            let mut headers = HeaderMap::new();
            headers.insert("x-upstream", HeaderValue::from_static("echo"));
            Ok(ForwardResponse {
                status: StatusCode::IM_A_TEAPOT,
                headers,
                body: format!("{} {}", request.method, request.path_and_query()).into(),
            })
        }
    }
}
