//! # エンドポイント分類と署名
//!
//! 認証付きエンドポイントには `timestamp` と `signature` を付与する。
//!
//! ## 署名手順
//! 1. `timestamp`（エポックミリ秒）を追加
//! 2. その時点のパラメータを正規化クエリ文字列にエンコード
//! 3. シークレットキーでHMAC-SHA256を計算（小文字16進数）
//! 4. `signature` を末尾に追加

use binance_relay_crypto::hmac_sha256_hex;

use crate::error::RelayError;
use crate::params::QueryParams;

/// パスにこれらの部分文字列が含まれていれば認証付きとみなす。
/// パスセグメント単位ではなく単純な部分文字列一致。
const AUTHENTICATED_MARKERS: [&str; 3] = ["account", "allOrders", "myTrades"];

/// エンドポイントのアクセス区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointAccess {
    /// 署名不要
    Public,
    /// `timestamp` + `signature` が必要
    Authenticated,
}

impl EndpointAccess {
    pub fn requires_signature(self) -> bool {
        self == EndpointAccess::Authenticated
    }
}

/// エンドポイントパスを分類する。
pub fn classify(endpoint: &str) -> EndpointAccess {
    if AUTHENTICATED_MARKERS
        .iter()
        .any(|marker| endpoint.contains(marker))
    {
        EndpointAccess::Authenticated
    } else {
        EndpointAccess::Public
    }
}

/// `timestamp` と `signature` を付与したパラメータを返す。
///
/// 署名対象は `timestamp` 追加後・`signature` 追加前のクエリ文字列。
pub fn sign(
    params: QueryParams,
    secret_key: &str,
    timestamp_ms: i64,
) -> Result<QueryParams, RelayError> {
    let mut signed = params;
    signed.insert("timestamp", timestamp_ms.to_string());

    let payload = signed.to_query_string();
    let signature = hmac_sha256_hex(secret_key, &payload)?;

    signed.insert("signature", signature);
    Ok(signed)
}

/// `<base><endpoint>[?<query>]` を組み立てる。
pub fn build_url(base_url: &str, endpoint: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        format!("{base_url}{endpoint}")
    } else {
        format!("{base_url}{endpoint}?{}", params.to_query_string())
    }
}
