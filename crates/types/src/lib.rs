//! # Binance Relay 共有型定義
//!
//! クライアントとRelayの間でやり取りされるJSON構造をRust構造体として提供する。
//!
//! ## 命名規則
//! - ワイヤ上のフィールド名はcamelCase（ブラウザクライアントとの互換性のため）
//! - Rust側のフィールド名はsnake_case

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// リクエスト
// ---------------------------------------------------------------------------

/// `POST /binance-proxy` のリクエストボディ。
///
/// 全フィールドをOptionとして受け取り、必須チェックはRelay側で行う。
/// `null` と欠落は同じ扱い。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// 取引所APIキー（`X-MBX-APIKEY` ヘッダとして転送）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// 取引所シークレットキー（認証付きエンドポイントでのみ必要）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// 上流のパス（例: `/api/v3/account`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// クエリパラメータ。キーの出現順を保持する。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// エラーエンベロープ
// ---------------------------------------------------------------------------

/// 入力不足によるエラー（HTTP 400）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub error: String,
}

/// 上流がエラーを返した場合のボディ（HTTP 400）。
/// `status` は上流の実際のHTTPステータス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamErrorBody {
    pub error: String,
    pub status: u16,
}

/// 内部エラー（HTTP 500）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalErrorBody {
    pub error: String,
    /// ISO-8601形式（ミリ秒、UTC）
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// ヘルスチェック
// ---------------------------------------------------------------------------

/// `GET /` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// `GET /health` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// プロセス起動からの経過秒数
    pub uptime: f64,
}
