//! 핸들러 패닉 처리.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::error::ApiErrorResponse;

/// 패닉을 로그에 남기고 내부 정보 없이 500 응답을 만듭니다.
///
/// `CatchPanicLayer::custom`에 전달합니다.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(
            "INTERNAL_ERROR",
            "내부 서버 에러가 발생했습니다",
        )),
    )
        .into_response()
}
