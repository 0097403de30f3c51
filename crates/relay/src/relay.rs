//! # 署名リレー
//!
//! ## 処理フロー
//! 1. 入力検証（apiKey / endpoint）
//! 2. エンドポイント分類（公開 / 認証付き）
//! 3. 認証付きならsecretKeyを確認して署名
//! 4. URL構築
//! 5. 上流呼び出し
//! 6. 結果のマッピング
//!
//! 1〜4は `prepare`、6は `map_outcome` で、いずれもI/Oを伴わない。

use binance_relay_types::RelayRequest;

use crate::config::RelayState;
use crate::error::RelayError;
use crate::params::{number_to_string, QueryParams};
use crate::signing::{self, EndpointAccess};
use crate::upstream::UpstreamResponse;

/// 上流呼び出しの準備が整ったリクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    /// クエリ込みの完全なURL
    pub url: String,
    /// `X-MBX-APIKEY` に載せる値
    pub api_key: String,
    /// 上流のパス（ログ用）
    pub endpoint: String,
    pub access: EndpointAccess,
}

/// 空文字列はNoneとして扱う。
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// 入力検証・分類・署名・URL構築を行う。
///
/// `now_ms` は認証付きエンドポイントの `timestamp` に使われる。
pub fn prepare(
    request: &RelayRequest,
    base_url: &str,
    now_ms: i64,
) -> Result<PreparedCall, RelayError> {
    let (api_key, endpoint) = match (
        non_empty(request.api_key.as_deref()),
        non_empty(request.endpoint.as_deref()),
    ) {
        (Some(api_key), Some(endpoint)) => (api_key, endpoint),
        _ => return Err(RelayError::MissingCredential),
    };

    let access = signing::classify(endpoint);

    let mut params = match &request.params {
        Some(map) => QueryParams::from_json(map)?,
        None => QueryParams::new(),
    };

    if access.requires_signature() {
        let secret_key =
            non_empty(request.secret_key.as_deref()).ok_or(RelayError::MissingSecret)?;
        params = signing::sign(params, secret_key, now_ms)?;
        tracing::debug!(endpoint, "認証付きエンドポイントの署名を生成しました");
    }

    Ok(PreparedCall {
        url: signing::build_url(base_url, endpoint, &params),
        api_key: api_key.to_string(),
        endpoint: endpoint.to_string(),
        access,
    })
}

/// 上流レスポンスをクライアント向けの結果に変換する。
///
/// - 成功: ボディをJSONとしてパースしてそのまま返す
/// - 失敗: `msg` フィールド（なければ生テキスト）を取り出して `UpstreamRejected`
pub fn map_outcome(response: UpstreamResponse) -> Result<serde_json::Value, RelayError> {
    if !response.is_success() {
        let message = upstream_error_message(&response.body);
        return Err(RelayError::UpstreamRejected {
            status: response.status,
            message,
        });
    }

    serde_json::from_str(&response.body)
        .map_err(|e| RelayError::Internal(format!("Respuesta inválida de Binance: {e}")))
}

/// エラーボディからメッセージを取り出す。
///
/// `msg` が偽値（空文字列・`0`・`false`・`null`・欠落）なら生テキストを使う。
/// 配列・オブジェクトの `msg` も生テキスト扱い。
fn upstream_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|v| v.get("msg")) {
        Some(serde_json::Value::String(msg)) if !msg.is_empty() => msg.clone(),
        Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => number_to_string(n),
        Some(serde_json::Value::Bool(true)) => "true".to_string(),
        _ => body.to_string(),
    }
}

/// 1リクエスト分のリレーを実行する。
pub async fn relay(
    state: &RelayState,
    request: &RelayRequest,
) -> Result<serde_json::Value, RelayError> {
    let call = prepare(
        request,
        &state.config.upstream_base_url,
        state.clock.now_millis(),
    )?;

    tracing::info!(endpoint = %call.endpoint, access = ?call.access, "Binanceを呼び出します");

    let response = state.upstream.get(&call.url, &call.api_key).await?;

    tracing::info!(endpoint = %call.endpoint, status = response.status, "Binanceからの応答");
    if !response.is_success() {
        tracing::error!(
            endpoint = %call.endpoint,
            status = response.status,
            body = %response.body,
            "Binanceがエラーを返しました"
        );
    }

    map_outcome(response)
}
