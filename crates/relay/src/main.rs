//! # Binance Relay
//!
//! ブラウザにシークレットキーを渡さずに取引所REST APIを呼び出すための署名リレー。
//!
//! ## 役割
//! - 入力検証（apiKey / endpoint / secretKey）
//! - 認証付きエンドポイントへの `timestamp` + HMAC-SHA256 `signature` 付与
//! - 上流へのGET中継と結果・エラーの正規化
//!
//! キャッシュ・レート制限・リトライ・永続化は行わない。各リクエストは独立している。
//!
//! ## API エンドポイント
//! - `POST /binance-proxy`: 署名付きリレー
//! - `GET /`: 稼働表示
//! - `GET /health`: ヘルスチェック

mod clock;
mod config;
mod endpoints;
mod error;
mod params;
mod relay;
mod signing;
mod upstream;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clock::SystemClock;
use crate::config::{RelayConfig, RelayState};
use crate::upstream::HttpUpstream;

/// 設定されたオリジンのみを許可するCORSレイヤーを構築する。
fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("CORSオリジンが不正です: {o}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request()))
}

/// ルーターを構築する。
fn build_router(state: Arc<RelayState>) -> anyhow::Result<axum::Router> {
    let cors = cors_layer(&state.config.cors_origins)?;

    Ok(axum::Router::new()
        .route("/", axum::routing::get(endpoints::handle_root))
        .route("/health", axum::routing::get(endpoints::handle_health))
        .route("/binance-proxy", axum::routing::post(endpoints::handle_proxy))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    tracing::info!(
        upstream = %config.upstream_base_url,
        timeout = ?config.upstream_timeout,
        origins = ?config.cors_origins,
        "設定を読み込みました"
    );

    let upstream = HttpUpstream::new(&config.user_agent, config.upstream_timeout)
        .context("HTTPクライアントの初期化に失敗しました")?;
    let addr = format!("0.0.0.0:{}", config.port);

    let state = Arc::new(RelayState::new(
        config,
        Box::new(upstream),
        Box::new(SystemClock),
    ));
    let app = build_router(state)?;

    tracing::info!("Binance Relayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗しました"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Binance Relayを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl+Cハンドラの登録に失敗: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERMハンドラの登録に失敗: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINTを受信しました"),
        _ = terminate => tracing::info!("SIGTERMを受信しました"),
    }
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
