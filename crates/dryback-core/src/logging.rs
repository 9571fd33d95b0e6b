//! tracing 기반 로깅 초기화.
//!
//! 출력 형식(pretty, json, compact)과 관계없이 필터 하나와 fmt 레이어 하나로 구성됩니다.
//! 요청 기록은 `dryback::access` 타겟으로 출력되며 `[logging] access_log = false`로 끌 수 있습니다.
//! `RUST_LOG`가 있으면 설정된 레벨 대신 사용합니다.

use tracing::Subscriber;
use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 요청 기록에 사용하는 tracing 타겟.
pub const ACCESS_LOG_TARGET: &str = "dryback::access";

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "debug", "dryback_data=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 요청 기록 출력 여부
    pub access_log: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            access_log: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 애플리케이션 설정의 `[logging]` 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식은 pretty로 대체합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            access_log: settings.access_log,
        }
    }

    /// 레벨 필터를 만듭니다. 요청 기록이 꺼져 있으면 해당 타겟을 막습니다.
    ///
    /// # Errors
    /// 레벨 문자열을 해석할 수 없으면 `ParseError`를 반환합니다.
    pub fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.level)?,
        };

        if self.access_log {
            Ok(filter)
        } else {
            Ok(filter.add_directive(format!("{}=off", ACCESS_LOG_TARGET).parse()?))
        }
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        let layer = fmt::layer().with_target(true);
        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// # 예제
///
/// ```no_run
/// use dryback_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(config.fmt_layer())
        .try_init()?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        access_log = config.access_log,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings_falls_back_to_pretty() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "fancy".to_string(),
            access_log: false,
        };
        let config = LogConfig::from_settings(&settings);

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.access_log);
    }

    #[test]
    fn test_disabled_access_log_is_filtered_out() {
        let config = LogConfig {
            access_log: false,
            ..LogConfig::new("info")
        };
        let filter = config.env_filter().unwrap();

        assert!(filter.to_string().contains("dryback::access=off"));
    }

    #[test]
    fn test_enabled_access_log_adds_no_directive() {
        let filter = LogConfig::new("info").env_filter().unwrap();

        assert!(!filter.to_string().contains(ACCESS_LOG_TARGET));
    }
}
