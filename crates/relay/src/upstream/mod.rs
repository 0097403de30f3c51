//! # 上流APIクライアント
//!
//! Relayが呼び出す外部REST APIの抽象インターフェース。
//! reqwestによる実装は `http` サブモジュールを参照。

pub mod http;

pub use http::HttpUpstream;

use crate::error::RelayError;

/// APIキーを載せるヘッダ名（上流の契約で固定）
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// 上流のHTTPレスポンス。ボディはパース前のテキストのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    /// 2xxなら成功。
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 上流APIの抽象インターフェース。
///
/// リクエストは常にGETでボディなし。
/// 通信自体の失敗は `RelayError::UpstreamUnreachable` として返し、
/// HTTPステータスの成否は呼び出し側が判断する。
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, url: &str, api_key: &str) -> Result<UpstreamResponse, RelayError>;
}
