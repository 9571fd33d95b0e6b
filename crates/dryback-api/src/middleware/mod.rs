//! 게이트웨이 HTTP middleware.
//!
//! 요청 처리 파이프라인에 적용되는 middleware 모듈.

mod access_log;
mod metrics;
mod panic;

pub use access_log::access_log_layer;
pub use metrics::metrics_layer;
pub use panic::handle_panic;
