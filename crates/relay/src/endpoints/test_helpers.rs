//! # エンドポイントテスト用共通ヘルパー
//!
//! 呼び出しを記録するモック上流と、実HTTPのモック上流サーバー。

use std::sync::{Arc, Mutex};

use crate::clock::FixedClock;
use crate::config::{RelayConfig, RelayState};
use crate::error::RelayError;
use crate::upstream::{Upstream, UpstreamResponse};

/// 呼び出し内容を記録し、固定レスポンスを返すモック上流。
pub struct RecordingUpstream {
    response: Result<UpstreamResponse, String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingUpstream {
    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            response: Ok(UpstreamResponse {
                status,
                body: body.to_string(),
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::with_status(200, body)
    }

    /// 常に通信エラーを返す。
    pub fn unreachable(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 記録された `(url, api_key)` の共有ハンドル。
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl Upstream for RecordingUpstream {
    async fn get(&self, url: &str, api_key: &str) -> Result<UpstreamResponse, RelayError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), api_key.to_string()));
        self.response
            .clone()
            .map_err(RelayError::UpstreamUnreachable)
    }
}

/// テスト用RelayStateを構築する。ベースURLは `https://api.binance.com`。
pub fn test_state(upstream: RecordingUpstream, now_ms: i64) -> Arc<RelayState> {
    Arc::new(RelayState::new(
        RelayConfig::default(),
        Box::new(upstream),
        Box::new(FixedClock::at_millis(now_ms)),
    ))
}

/// ルーターを `127.0.0.1` の空きポートで起動し、ポート番号を返す。
pub async fn spawn_server(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
