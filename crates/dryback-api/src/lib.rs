//! 거래소 API 게이트웨이 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 요청 분기: 예약된 캔들 엔드포인트는 로컬 CSV 재생, 나머지는 업스트림 중계
//! - 재생 커서 관리 엔드포인트
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`dispatch`]: 요청 분류 및 fallback 핸들러
//! - [`routes`]: 운영용 엔드포인트
//! - [`app`]: 미들웨어를 포함한 전체 라우터
//! - [`server`]: 서버 실행 및 graceful shutdown
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod app;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use app::create_router;
pub use dispatch::{classify, dispatch_handler, Intent, KlineQuery, RouteKind};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use server::{serve, shutdown_signal};
pub use state::AppState;
