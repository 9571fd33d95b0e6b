//! 로컬 캔들 데이터 재생.
//!
//! 이 crate는 다음을 제공합니다:
//! - CSV 레코드 → [`KlineRecord`](dryback_core::KlineRecord) 디코더
//! - 데이터 파일별 순차 재생 커서 저장소
//!
//! # 모듈 구성
//!
//! - [`decoder`]: 12개 필드 레코드 디코딩
//! - [`cursor`]: 파일별 읽기 위치를 관리하는 [`RowCursorStore`]
//! - [`error`]: 커서/디코딩 에러 타입

pub mod cursor;
pub mod decoder;
pub mod error;

pub use cursor::{CursorSnapshot, RowCursorStore};
pub use decoder::{decode_fields, decode_record};
pub use error::{CursorError, DecodeError, Result};
