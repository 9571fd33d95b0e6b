//! 설정 관리.
//!
//! 이 모듈은 게이트웨이 설정을 정의하고 관리합니다.
//! 모든 필드는 기본값을 가지므로 설정 파일 없이도 기동할 수 있습니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 설정 파일 경로를 지정하는 환경 변수.
pub const CONFIG_PATH_ENV: &str = "DRYBACK_CONFIG";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 업스트림 거래소 설정
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// 로컬 데이터 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 로컬 캔들 엔드포인트 목록
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<LocalEndpointConfig>,
    /// CORS 허용 origin (비어 있으면 모두 허용)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 전달할 요청 본문 최대 크기 (바이트)
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9999,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 업스트림 거래소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// 로컬 데이터 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV 데이터 파일 디렉토리
    pub data_dir: PathBuf,
    /// 데이터 소스 카탈로그 (JSON) 경로
    pub sources_file: PathBuf,
    /// 데이터 파일 첫 줄이 헤더인지 여부
    pub has_headers: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sources_file: PathBuf::from("config/sources.json"),
            has_headers: false,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 요청마다 한 건씩 남기는 요청 기록 출력 여부
    pub access_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            access_log: true,
        }
    }
}

/// 로컬 재생으로 처리하는 캔들 엔드포인트.
///
/// market은 경로에 의해 결정되며 쿼리 파라미터로 받지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalEndpointConfig {
    /// 예약된 경로 (예: "/api/v3/klines")
    pub path: String,
    /// 이 경로가 의미하는 market (예: "spot")
    pub market: String,
}

impl LocalEndpointConfig {
    pub fn new(path: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            market: market.into(),
        }
    }
}

fn default_endpoints() -> Vec<LocalEndpointConfig> {
    vec![LocalEndpointConfig::new("/api/v3/klines", "spot")]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            data: DataConfig::default(),
            logging: LoggingConfig::default(),
            endpoints: default_endpoints(),
            cors_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("DRYBACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로(또는 `DRYBACK_CONFIG`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }
}
