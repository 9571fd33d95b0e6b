//! 캔들(kline) 레코드 타입.
//!
//! 바이낸스 `/api/v3/klines` 응답과 동일한 12개 필드 배열 형식으로 직렬화됩니다.

use serde::{Deserialize, Serialize};

/// 12개 필드로 구성된 OHLCV 캔들 레코드.
///
/// JSON으로는 필드 순서대로 12개 값을 가진 배열이 됩니다:
///
/// ```json
/// [1000, 10.0, 11.0, 9.0, 10.5, 100.0, 1999, 1050.0, 5, 50.0, 525.0, 0.0]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "KlineRow", into = "KlineRow")]
pub struct KlineRecord {
    /// 시가 시각 (epoch ms)
    pub open_time: i64,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
    /// 종가 시각 (epoch ms)
    pub close_time: i64,
    /// 호가 자산 거래대금
    pub quote_volume: f64,
    /// 체결 건수
    pub trade_count: i64,
    /// Taker 매수 기준 자산 거래량
    pub taker_buy_base_volume: f64,
    /// Taker 매수 호가 자산 거래대금
    pub taker_buy_quote_volume: f64,
    /// 사용하지 않는 필드
    pub ignored: f64,
}

impl KlineRecord {
    /// 필드 개수.
    pub const FIELD_COUNT: usize = 12;

    /// 직렬화 순서대로 나열한 필드 이름.
    pub const FIELD_NAMES: [&'static str; Self::FIELD_COUNT] = [
        "open_time",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "close_time",
        "quote_volume",
        "trade_count",
        "taker_buy_base_volume",
        "taker_buy_quote_volume",
        "ignored",
    ];
}

/// 와이어 형식 (12-튜플).
#[derive(Serialize, Deserialize)]
struct KlineRow(i64, f64, f64, f64, f64, f64, i64, f64, i64, f64, f64, f64);

impl From<KlineRow> for KlineRecord {
    fn from(row: KlineRow) -> Self {
        Self {
            open_time: row.0,
            open: row.1,
            high: row.2,
            low: row.3,
            close: row.4,
            volume: row.5,
            close_time: row.6,
            quote_volume: row.7,
            trade_count: row.8,
            taker_buy_base_volume: row.9,
            taker_buy_quote_volume: row.10,
            ignored: row.11,
        }
    }
}

impl From<KlineRecord> for KlineRow {
    fn from(k: KlineRecord) -> Self {
        KlineRow(
            k.open_time,
            k.open,
            k.high,
            k.low,
            k.close,
            k.volume,
            k.close_time,
            k.quote_volume,
            k.trade_count,
            k.taker_buy_base_volume,
            k.taker_buy_quote_volume,
            k.ignored,
        )
    }
}
