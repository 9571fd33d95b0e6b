//! 업스트림 거래소 중계.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Upstream trait: 요청을 그대로 전달하고 응답을 돌려주는 인터페이스
//! - Binance REST 업스트림 (reqwest)
//! - hop-by-hop 헤더 필터

pub mod binance;
pub mod error;
pub mod headers;
pub mod traits;

pub use binance::BinanceUpstream;
pub use error::*;
pub use headers::{filter_headers, is_hop_by_hop};
pub use traits::*;
