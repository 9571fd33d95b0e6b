//! 데이터 모듈 오류 타입.

use dryback_core::GatewayError;
use thiserror::Error;

/// 레코드 디코딩 오류.
///
/// 디코딩은 전부 성공하거나 전부 실패하며, 부분 레코드는 반환되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// 필드 개수 부족
    #[error("expected at least {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },

    /// 정수 필드 파싱 실패 (숫자가 아니거나 범위 초과)
    #[error("field {index} ({name}): invalid integer {value:?}")]
    Integer {
        index: usize,
        name: &'static str,
        value: String,
    },

    /// 실수 필드 파싱 실패
    #[error("field {index} ({name}): invalid number {value:?}")]
    Float {
        index: usize,
        name: &'static str,
        value: String,
    },

    /// NaN / 무한대
    #[error("field {index} ({name}): value out of range {value:?}")]
    OutOfRange {
        index: usize,
        name: &'static str,
        value: String,
    },

    /// CSV 형식 오류 (잘못된 UTF-8 등)
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// 커서 저장소 오류.
#[derive(Debug, Error)]
pub enum CursorError {
    /// 데이터 파일이 존재하지 않음
    #[error("Data file not found: {0}")]
    SourceMissing(String),

    /// 남은 레코드 없음
    #[error("No more records in {0}")]
    Exhausted(String),

    /// 현재 위치의 레코드 디코딩 실패 (위치는 진행되지 않음)
    #[error("Failed to decode {file_id} record #{offset}: {source}")]
    Decode {
        file_id: String,
        offset: u64,
        #[source]
        source: DecodeError,
    },

    /// 파일 I/O 오류
    #[error("I/O error on {file_id}: {source}")]
    Io {
        file_id: String,
        #[source]
        source: std::io::Error,
    },
}

impl CursorError {
    pub(crate) fn io(file_id: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            CursorError::SourceMissing(file_id.to_string())
        } else {
            CursorError::Io {
                file_id: file_id.to_string(),
                source,
            }
        }
    }
}

impl From<CursorError> for GatewayError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::SourceMissing(file_id) => GatewayError::SourceMissing(file_id),
            CursorError::Exhausted(file_id) => GatewayError::Exhausted(file_id),
            CursorError::Decode {
                file_id,
                offset,
                source,
            } => GatewayError::Decode {
                file_id,
                offset,
                reason: source.to_string(),
            },
            CursorError::Io { file_id, source } => {
                GatewayError::Internal(format!("I/O error on {}: {}", file_id, source))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CursorError>;
