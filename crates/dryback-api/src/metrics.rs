//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 재생/중계 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 경우(테스트 등) 모든 기록은 무시됩니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # Errors
///
/// 레코더가 이미 설치되어 있으면 `BuildError`를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("upstream_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// 완료된 HTTP 요청 기록.
///
/// `route`는 응답을 만든 경로 종류("local", "upstream", "operational")입니다.
pub fn record_http(method: &str, path: &str, route: &str, status: u16, duration_secs: f64) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 게이트웨이 메트릭 헬퍼 함수
// ============================================================================

/// 로컬 재생 결과 기록.
///
/// `outcome`은 "served" 또는 에러 코드입니다.
pub fn record_replay(market: &str, symbol: &str, interval: &str, outcome: &str) {
    counter!(
        "kline_replay_total",
        "market" => market.to_string(),
        "symbol" => symbol.to_string(),
        "interval" => interval.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 업스트림 중계 결과 기록.
///
/// `outcome`은 업스트림 상태 코드 또는 에러 코드입니다.
pub fn record_upstream(method: &str, outcome: &str, duration_secs: f64) {
    counter!(
        "upstream_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("upstream_request_duration_seconds", "method" => method.to_string())
        .record(duration_secs);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 중계 경로는 임의의 값을 포함할 수 있으므로 라벨 카디널리티를 제한합니다.
/// 예: `/api/v3/order/123456` → `/api/v3/order/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
