//! 게이트웨이 통합 테스트.
//!
//! 로컬 CSV 재생과 업스트림 중계(mockito 스텁)를 라우터 전체를 통해 확인합니다.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use dryback_api::{create_router, serve, ApiErrorResponse, AppState};
use dryback_core::{KlineRecord, SourceCatalog, UpstreamConfig};
use dryback_data::RowCursorStore;
use dryback_exchange::BinanceUpstream;
use mockito::Matcher;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const ROWS: [&str; 3] = [
    "1000,10,11,9,10.5,100,1999,1050,5,50,525,0",
    "2000,10.5,12,10,11.5,200,2999,2300,8,100,1150,0",
    "3000,11.5,13,11,12.5,300,3999,3750,12,150,1875,0",
];

const KLINES: &str = "/api/v3/klines?symbol=BTCUSDT&interval=1m";

struct Gateway {
    _dir: tempfile::TempDir,
    state: Arc<AppState>,
    app: Router,
}

fn gateway(upstream_url: &str) -> Gateway {
    gateway_with_timeout(upstream_url, 5)
}

fn gateway_with_timeout(upstream_url: &str, timeout_secs: u64) -> Gateway {
    let dir = tempfile::tempdir().unwrap();
    write_rows(dir.path(), "BTCUSDT_1m.csv", &ROWS);

    let catalog = SourceCatalog::from_json_str(
        r#"{ "spot": { "BTCUSDT": { "1m": "BTCUSDT_1m.csv", "5m": "BTCUSDT_5m.csv" } } }"#,
    )
    .unwrap();

    let upstream = BinanceUpstream::new(&UpstreamConfig {
        base_url: upstream_url.to_string(),
        timeout_secs,
        connect_timeout_secs: 1,
    })
    .unwrap();

    let state = Arc::new(AppState::new(
        catalog,
        Arc::new(RowCursorStore::new(dir.path())),
        Arc::new(upstream),
    ));
    let app = create_router(Arc::clone(&state), None);

    Gateway {
        _dir: dir,
        state,
        app,
    }
}

fn write_rows(dir: &Path, name: &str, rows: &[&str]) {
    let mut content = rows.join("\n");
    content.push('\n');
    std::fs::write(dir.join(name), content).unwrap();
}

async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

async fn get(app: &Router, target: &str) -> (StatusCode, Vec<u8>) {
    let (status, _, body) = send(
        app,
        Request::builder().uri(target).body(Body::empty()).unwrap(),
    )
    .await;
    (status, body)
}

fn error_code(body: &[u8]) -> String {
    let error: ApiErrorResponse = serde_json::from_slice(body).unwrap();
    error.code
}

#[tokio::test]
async fn test_replays_three_rows_then_exhausts_and_resets() {
    let gw = gateway("http://127.0.0.1:9");

    for (i, expected_open_time) in [1000, 2000, 3000].into_iter().enumerate() {
        let (status, body) = get(&gw.app, KLINES).await;
        assert_eq!(status, StatusCode::OK, "call {}", i + 1);

        let klines: Vec<KlineRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].open_time, expected_open_time);
    }

    // 4번째 호출은 소진
    let (status, body) = get(&gw.app, KLINES).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NO_MORE_DATA");

    // 되감기 후 첫 행부터 다시
    let (status, _, _) = send(
        &gw.app,
        Request::builder()
            .method("POST")
            .uri("/admin/cursors/reset?market=spot&symbol=BTCUSDT&interval=1m")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&gw.app, KLINES).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!([[
            1000, 10.0, 11.0, 9.0, 10.5, 100.0, 1999, 1050.0, 5, 50.0, 525.0, 0.0
        ]])
    );
}

#[tokio::test]
async fn test_local_errors_have_distinct_codes() {
    let gw = gateway("http://127.0.0.1:9");

    // 설정에 없는 조합
    let (status, body) = get(&gw.app, "/api/v3/klines?symbol=ETHUSDT&interval=1m").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "CONFIG_NOT_FOUND");

    // 설정은 있지만 파일이 없음
    let (status, body) = get(&gw.app, "/api/v3/klines?symbol=BTCUSDT&interval=5m").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "SOURCE_MISSING");
}

#[tokio::test]
async fn test_unconfigured_path_is_relayed_byte_for_byte() {
    let mut server = mockito::Server::new_async().await;
    let upstream_body =
        br#"{"symbol":"BTCUSDT","priceChange":"-94.99999800","lastPrice":"4.00000200"}"#;
    let mock = server
        .mock("GET", "/api/v3/ticker")
        .match_query(Matcher::Exact("symbol=BTCUSDT".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json;charset=UTF-8")
        .with_body(upstream_body.as_slice())
        .create_async()
        .await;

    let gw = gateway(&server.url());
    let (status, headers, body) = send(
        &gw.app,
        Request::builder()
            .uri("/api/v3/ticker?symbol=BTCUSDT")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream_body.to_vec());
    assert_eq!(headers["content-type"], "application/json;charset=UTF-8");
    // 중계는 커서를 만들지 않는다
    assert_eq!(gw.state.cursors.open_cursors().await, 0);
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let mut server = mockito::Server::new_async().await;
    let upstream_body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
    let _mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(upstream_body)
        .create_async()
        .await;

    let gw = gateway(&server.url());

    // 예약된 경로라도 interval이 없으면 중계
    let (status, body) = get(&gw.app, "/api/v3/klines?symbol=NOPE").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, upstream_body.as_bytes().to_vec());
}

#[tokio::test]
async fn test_post_body_and_headers_are_forwarded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order")
        .match_query(Matcher::Exact("timestamp=1&signature=abc".to_string()))
        .match_header("x-mbx-apikey", "my-key")
        .match_body(Matcher::Exact("symbol=BTCUSDT&side=BUY".to_string()))
        .with_status(200)
        .with_body(r#"{"orderId":1}"#)
        .create_async()
        .await;

    let gw = gateway(&server.url());
    let (status, _, body) = send(
        &gw.app,
        Request::builder()
            .method("POST")
            .uri("/api/v3/order?timestamp=1&signature=abc")
            .header("x-mbx-apikey", "my-key")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("symbol=BTCUSDT&side=BUY"))
            .unwrap(),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, br#"{"orderId":1}"#.to_vec());
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = gateway(&format!("http://{}", addr));
    let (status, body) = get(&gw.app, "/api/v3/ping").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_silent_upstream_is_gateway_timeout() {
    // 연결은 받지만 응답하지 않는 업스트림
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let gw = gateway_with_timeout(&format!("http://{}", addr), 1);
    let (status, body) = get(&gw.app, "/api/v3/depth?symbol=BTCUSDT").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_code(&body), "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let gw = gateway("http://127.0.0.1:9");
    let limit = gw.state.server.max_body_bytes;

    let (status, _, body) = send(
        &gw.app,
        Request::builder()
            .method("POST")
            .uri("/api/v3/order")
            .body(Body::from(vec![b'x'; limit + 1]))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_code(&body), "PAYLOAD_TOO_LARGE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_cursor() {
    let gw = gateway("http://127.0.0.1:9");

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let app = gw.app.clone();
            tokio::spawn(async move { get(&app, KLINES).await })
        })
        .collect();

    let mut served = Vec::new();
    let mut exhausted = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::OK => {
                let klines: Vec<KlineRecord> = serde_json::from_slice(&body).unwrap();
                served.push(klines[0].open_time);
            }
            StatusCode::NOT_FOUND => {
                assert_eq!(error_code(&body), "NO_MORE_DATA");
                exhausted += 1;
            }
            other => panic!("unexpected status {other}"),
        }
    }

    served.sort_unstable();
    assert_eq!(served, vec![1000, 2000, 3000]);
    assert_eq!(exhausted, 3);
}

#[tokio::test]
async fn test_serves_over_tcp_until_cancelled() {
    let mut upstream = mockito::Server::new_async().await;
    let _mock = upstream
        .mock("GET", "/api/v3/ping")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let gw = gateway(&upstream.url());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let token = CancellationToken::new();
    let server = tokio::spawn(serve(listener, gw.app.clone(), token.clone()));

    let client = reqwest::Client::new();
    let kline = client
        .get(format!("http://{}{}", addr, KLINES))
        .send()
        .await
        .unwrap();
    assert_eq!(kline.status(), reqwest::StatusCode::OK);
    let klines: Vec<KlineRecord> = kline.json().await.unwrap();
    assert_eq!(klines[0].open_time, 1000);

    let ping = client
        .get(format!("http://{}/api/v3/ping", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(ping.status(), reqwest::StatusCode::OK);
    assert_eq!(ping.text().await.unwrap(), "{}");
    drop(client);

    token.cancel();
    server.await.unwrap().unwrap();

    assert_eq!(gw.state.cursors.shutdown().await, 1);
}
