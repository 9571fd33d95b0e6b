//! 로컬 데이터 소스 카탈로그.
//!
//! `(market, symbol, interval)` 키를 데이터 파일 식별자로 매핑합니다.
//! 시작 시점에 JSON 문서에서 한 번 로드되며 프로세스 수명 동안 변경되지 않습니다.
//!
//! # 파일 형식
//!
//! ```json
//! {
//!   "spot": {
//!     "BTCUSDT": { "1m": "BTCUSDT_1m.csv", "1h": "BTCUSDT_1h.csv" }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};

/// 데이터 파일 식별자 (데이터 디렉토리 기준 상대 경로).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct DataFileId(String);

impl DataFileId {
    /// 새 식별자 생성.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 문자열로 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DataFileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 조회에 실패한 키 단계.
///
/// 내부 로깅에만 사용되며 응답에서는 모두 `ConfigNotFound`로 합쳐집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLevel {
    Market,
    Symbol,
    Interval,
}

impl fmt::Display for MissingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingLevel::Market => "market",
            MissingLevel::Symbol => "symbol",
            MissingLevel::Interval => "interval",
        };
        f.write_str(name)
    }
}

/// 카탈로그 조회 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// 설정된 데이터 파일
    Found(&'a DataFileId),
    /// 설정 없음
    NotFound(MissingLevel),
}

impl<'a> Resolution<'a> {
    /// 찾은 식별자를 Option으로 반환.
    pub fn found(self) -> Option<&'a DataFileId> {
        match self {
            Resolution::Found(id) => Some(id),
            Resolution::NotFound(_) => None,
        }
    }

    /// `GatewayError::ConfigNotFound`로 변환합니다.
    pub fn or_not_found(
        self,
        market: &str,
        symbol: &str,
        interval: &str,
    ) -> GatewayResult<&'a DataFileId> {
        self.found().ok_or_else(|| GatewayError::ConfigNotFound {
            market: market.to_string(),
            symbol: symbol.to_string(),
            interval: interval.to_string(),
        })
    }
}

type IntervalMap = HashMap<String, DataFileId>;
type SymbolMap = HashMap<String, IntervalMap>;

/// 3단계 (market → symbol → interval) 데이터 소스 카탈로그.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog {
    markets: HashMap<String, SymbolMap>,
}

impl SourceCatalog {
    /// 빈 카탈로그 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 추가 (테스트 및 프로그래밍 방식 구성용).
    pub fn with_entry(
        mut self,
        market: impl Into<String>,
        symbol: impl Into<String>,
        interval: impl Into<String>,
        file_id: impl Into<String>,
    ) -> Self {
        self.markets
            .entry(market.into())
            .or_default()
            .entry(symbol.into())
            .or_default()
            .insert(interval.into(), DataFileId::new(file_id));
        self
    }

    /// JSON 문자열에서 카탈로그를 파싱합니다.
    ///
    /// # Errors
    /// JSON 형식이 잘못되었거나 빈 파일 식별자가 있으면 `GatewayError::Config`를 반환합니다.
    pub fn from_json_str(json: &str) -> GatewayResult<Self> {
        let catalog: SourceCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// 파일에서 카탈로그를 로드합니다.
    pub fn load(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!(
                "Failed to read source catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_json_str(&content)?;

        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            "Source catalog loaded"
        );

        Ok(catalog)
    }

    fn validate(&self) -> GatewayResult<()> {
        for (market, symbol, interval, file_id) in self.entries() {
            if file_id.as_str().trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "Empty data file for {}/{}/{}",
                    market, symbol, interval
                )));
            }
        }
        Ok(())
    }

    /// `(market, symbol, interval)`에 해당하는 데이터 파일을 조회합니다.
    ///
    /// 어느 단계에서든 키가 없으면 `NotFound`를 반환합니다.
    pub fn resolve(&self, market: &str, symbol: &str, interval: &str) -> Resolution<'_> {
        let Some(symbols) = self.markets.get(market) else {
            return Resolution::NotFound(MissingLevel::Market);
        };
        let Some(intervals) = symbols.get(symbol) else {
            return Resolution::NotFound(MissingLevel::Symbol);
        };
        match intervals.get(interval) {
            Some(file_id) => Resolution::Found(file_id),
            None => Resolution::NotFound(MissingLevel::Interval),
        }
    }

    /// 등록된 전체 항목 수.
    pub fn len(&self) -> usize {
        self.markets
            .values()
            .flat_map(|symbols| symbols.values())
            .map(|intervals| intervals.len())
            .sum()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 전체 항목 순회.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str, &DataFileId)> + '_ {
        self.markets.iter().flat_map(|(market, symbols)| {
            symbols.iter().flat_map(move |(symbol, intervals)| {
                intervals.iter().map(move |(interval, file_id)| {
                    (market.as_str(), symbol.as_str(), interval.as_str(), file_id)
                })
            })
        })
    }
}
