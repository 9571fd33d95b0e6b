//! # Dryback Core
//!
//! 거래소 게이트웨이의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 게이트웨이 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들(kline) 레코드 타입
//! - (market, symbol, interval) → 데이터 파일 카탈로그
//! - 게이트웨이 에러 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use catalog::{DataFileId, MissingLevel, Resolution, SourceCatalog};
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
