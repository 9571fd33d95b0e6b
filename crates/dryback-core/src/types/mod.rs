//! 게이트웨이 공통 타입.

pub mod kline;

pub use kline::KlineRecord;
