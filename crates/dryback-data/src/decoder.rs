//! 캔들 레코드 디코더.
//!
//! 쉼표로 구분된 한 행을 12개 필드 [`KlineRecord`]로 변환합니다.
//! 필드 0, 6, 8은 정수, 나머지는 실수입니다.
//! 12번째 이후 필드는 무시합니다.

use csv::{DeserializeErrorKind, StringRecord};
use dryback_core::KlineRecord;

use crate::error::DecodeError;

const NAMES: [&str; KlineRecord::FIELD_COUNT] = KlineRecord::FIELD_NAMES;

/// 실수 필드 위치.
const FLOAT_FIELDS: [usize; 9] = [1, 2, 3, 4, 5, 7, 9, 10, 11];

/// CSV 레코드를 디코딩합니다.
///
/// # Errors
/// 필드가 12개 미만이거나, 숫자가 아니거나, 범위를 벗어나면 `DecodeError`를 반환합니다.
pub fn decode_record(record: &StringRecord) -> Result<KlineRecord, DecodeError> {
    if record.len() < KlineRecord::FIELD_COUNT {
        return Err(DecodeError::Arity {
            expected: KlineRecord::FIELD_COUNT,
            found: record.len(),
        });
    }

    let mut fields: StringRecord = record.iter().take(KlineRecord::FIELD_COUNT).collect();
    fields.trim();

    let kline: KlineRecord = fields
        .deserialize(None)
        .map_err(|e| deserialize_error(&fields, e))?;

    let values = float_values(&kline);
    for (index, value) in FLOAT_FIELDS.into_iter().zip(values) {
        if !value.is_finite() {
            return Err(DecodeError::OutOfRange {
                index,
                name: NAMES[index],
                value: fields[index].to_string(),
            });
        }
    }

    Ok(kline)
}

/// 순서가 있는 문자열 필드를 디코딩합니다.
pub fn decode_fields(fields: &[&str]) -> Result<KlineRecord, DecodeError> {
    decode_record(&StringRecord::from(fields.to_vec()))
}

fn float_values(kline: &KlineRecord) -> [f64; 9] {
    [
        kline.open,
        kline.high,
        kline.low,
        kline.close,
        kline.volume,
        kline.quote_volume,
        kline.taker_buy_base_volume,
        kline.taker_buy_quote_volume,
        kline.ignored,
    ]
}

fn deserialize_error(fields: &StringRecord, err: csv::Error) -> DecodeError {
    let message = err.to_string();
    let csv::ErrorKind::Deserialize { err, .. } = err.into_kind() else {
        return DecodeError::Malformed(message);
    };

    let Some(index) = err.field().map(|field| field as usize) else {
        return DecodeError::Malformed(message);
    };
    let name = NAMES.get(index).copied().unwrap_or("unknown");
    let value = fields.get(index).unwrap_or_default().to_string();

    match err.kind() {
        DeserializeErrorKind::ParseInt(_) => DecodeError::Integer { index, name, value },
        DeserializeErrorKind::ParseFloat(_) => DecodeError::Float { index, name, value },
        _ => DecodeError::Malformed(message),
    }
}
