//! 중계 시 제거할 헤더.
//!
//! hop-by-hop 헤더는 연결 단위로만 의미가 있으므로 전달하지 않습니다.
//! `host`와 `content-length`는 HTTP 클라이언트/서버가 다시 계산합니다.

use reqwest::header::{HeaderMap, HeaderName, CONNECTION};

/// 전달하지 않는 헤더인지 확인합니다.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "host"
            | "content-length"
    )
}

/// hop-by-hop 헤더와 `Connection` 헤더에 나열된 헤더를 제거한 사본을 반환합니다.
///
/// 같은 이름의 헤더가 여러 개면 순서대로 모두 유지합니다.
pub fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || listed.iter().any(|token| token == name.as_str()) {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}
