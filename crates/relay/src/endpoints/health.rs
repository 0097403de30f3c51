//! # GET / , GET /health
//!
//! 稼働確認用。静的なステータスJSONを返す。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use binance_relay_types::{HealthStatus, ServiceStatus};

use crate::config::RelayState;
use crate::error::iso_timestamp;

/// GET /: サービス稼働表示。
pub async fn handle_root(State(state): State<Arc<RelayState>>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "OK".to_string(),
        message: "Binance Proxy Server Running".to_string(),
        timestamp: iso_timestamp(state.clock.now()),
    })
}

/// GET /health: プロセスの稼働時間。
pub async fn handle_health(State(state): State<Arc<RelayState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
