//! dryback 게이트웨이 서버.
//!
//! 설정된 (market, symbol, interval) 캔들 요청은 로컬 CSV에서 한 행씩 재생하고,
//! 나머지 요청은 업스트림 거래소로 그대로 중계합니다.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use dryback_api::{create_router, serve, setup_metrics_recorder, shutdown_signal, AppState};
use dryback_core::{init_logging, AppConfig, LogConfig, SourceCatalog};
use dryback_data::RowCursorStore;
use dryback_exchange::{BinanceUpstream, Upstream};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("Failed to load configuration")?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting dryback gateway...");

    let metrics_handle = setup_metrics_recorder().context("Failed to install metrics recorder")?;
    info!("Prometheus metrics recorder initialized");

    // 데이터 소스 카탈로그 (시작 시 한 번 로드)
    let catalog = SourceCatalog::load(&config.data.sources_file)?;
    for (market, symbol, interval, file_id) in catalog.entries() {
        info!(%market, %symbol, %interval, %file_id, "Kline source registered");
    }

    let cursors = Arc::new(
        RowCursorStore::new(&config.data.data_dir).with_headers(config.data.has_headers),
    );

    let upstream: Arc<dyn Upstream> = Arc::new(BinanceUpstream::new(&config.upstream)?);
    info!(
        upstream = upstream.name(),
        base_url = upstream.base_url(),
        timeout_secs = config.upstream.timeout_secs,
        "Upstream configured"
    );

    for endpoint in &config.endpoints {
        info!(path = %endpoint.path, market = %endpoint.market, "Local kline endpoint");
    }

    let state = Arc::new(AppState::from_config(
        &config,
        catalog,
        Arc::clone(&cursors),
        upstream,
    ));
    let app = create_router(state, Some(metrics_handle));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Gateway listening");
    info!("Metrics available at http://{}/metrics", addr);

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown_token.clone()));

    serve(listener, app, shutdown_token).await?;

    info!("Server shutdown initiated, releasing cursors...");
    let released = cursors.shutdown().await;
    info!(released, "Server stopped gracefully");

    Ok(())
}
