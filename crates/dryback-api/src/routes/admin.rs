//! 커서 관리 endpoint.
//!
//! 재생 커서의 현재 위치를 조회하고, 되감거나 닫습니다.
//!
//! - `GET  /admin/cursors` - 모든 커서 스냅샷
//! - `POST /admin/cursors/reset?market=&symbol=&interval=` - offset을 0으로 (파일 핸들 유지)
//! - `POST /admin/cursors/close?market=&symbol=&interval=` - 커서 제거 (파일 핸들 해제)

use axum::{
    extract::{OriginalUri, Query, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use dryback_core::{DataFileId, GatewayResult};
use dryback_data::CursorSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{into_api_error, ApiResult};
use crate::state::AppState;

/// 커서 대상 지정 쿼리.
#[derive(Debug, Deserialize)]
pub struct CursorKeyQuery {
    pub market: String,
    pub symbol: String,
    pub interval: String,
}

/// 커서 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CursorsResponse {
    pub cursors: Vec<CursorSnapshot>,
    pub total: usize,
}

/// 커서 작업 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CursorActionResponse {
    /// 대상 데이터 파일
    pub file_id: String,
    /// 수행한 작업 ("reset" | "close")
    pub action: String,
    /// 작업 전에 커서가 존재했는지 여부
    pub existed: bool,
}

/// 커서 스냅샷 조회.
///
/// GET /admin/cursors
pub async fn list_cursors(State(state): State<Arc<AppState>>) -> Json<CursorsResponse> {
    let cursors = state.cursors.snapshot().await;
    Json(CursorsResponse {
        total: cursors.len(),
        cursors,
    })
}

/// 커서 되감기.
///
/// POST /admin/cursors/reset
pub async fn reset_cursor(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(key): Query<CursorKeyQuery>,
) -> ApiResult<Json<CursorActionResponse>> {
    let file_id = resolve(&state, &key).map_err(|e| into_api_error(e, &method, &uri))?;
    let existed = state.cursors.reset(file_id.as_str()).await;

    info!(file_id = %file_id, existed, "Cursor reset requested");

    Ok(Json(CursorActionResponse {
        file_id: file_id.to_string(),
        action: "reset".to_string(),
        existed,
    }))
}

/// 커서 닫기.
///
/// POST /admin/cursors/close
pub async fn close_cursor(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(key): Query<CursorKeyQuery>,
) -> ApiResult<Json<CursorActionResponse>> {
    let file_id = resolve(&state, &key).map_err(|e| into_api_error(e, &method, &uri))?;
    let existed = state.cursors.close(file_id.as_str()).await;

    info!(file_id = %file_id, existed, "Cursor close requested");

    Ok(Json(CursorActionResponse {
        file_id: file_id.to_string(),
        action: "close".to_string(),
        existed,
    }))
}

fn resolve(state: &AppState, key: &CursorKeyQuery) -> GatewayResult<DataFileId> {
    state
        .catalog
        .resolve(&key.market, &key.symbol, &key.interval)
        .or_not_found(&key.market, &key.symbol, &key.interval)
        .cloned()
}

/// 커서 관리 라우터 생성.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cursors", get(list_cursors))
        .route("/cursors/reset", post(reset_cursor))
        .route("/cursors/close", post(close_cursor))
}
