//! # POST /binance-proxy
//!
//! クライアントの資格情報で上流APIを呼び出し、結果を中継する。
//! 全ての失敗はここでJSONエンベロープに変換され、プロセスには伝播しない。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use binance_relay_types::RelayRequest;
use tracing::Instrument;

use crate::config::RelayState;
use crate::error::RelayError;
use crate::relay::relay;

/// POST /binance-proxy: 署名付きリレー。
///
/// 成功時は上流のJSONをそのまま返す。パースできないボディは内部エラー（500）。
pub async fn handle_proxy(
    State(state): State<Arc<RelayState>>,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let Json(request) = body.map_err(|e| RelayError::Internal(e.body_text()))?;

    let span = tracing::info_span!(
        "binance_proxy",
        request_id = %uuid::Uuid::new_v4(),
        endpoint = request.endpoint.as_deref().unwrap_or_default(),
    );

    async move {
        tracing::info!("リクエストを処理します");
        match relay(&state, &request).await {
            Ok(value) => {
                tracing::info!("Binanceからの成功レスポンスを返却します");
                Ok(Json(value))
            }
            Err(e) => {
                match &e {
                    RelayError::MissingCredential | RelayError::MissingSecret => {
                        tracing::warn!(error = %e, "入力検証に失敗しました")
                    }
                    RelayError::UpstreamRejected { .. } => {}
                    _ => tracing::error!(error = %e, "プロキシ処理でエラーが発生しました"),
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use binance_relay_crypto::hmac_sha256_hex;

    use crate::endpoints::test_helpers::{test_state, RecordingUpstream};

    fn request(json: serde_json::Value) -> Result<Json<RelayRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(json).unwrap()))
    }

    async fn into_parts(
        result: Result<Json<serde_json::Value>, RelayError>,
    ) -> (StatusCode, serde_json::Value) {
        let resp = result.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// 公開エンドポイント: 署名なしで呼び出し、ボディをそのまま返す
    #[tokio::test]
    async fn test_public_endpoint_passthrough() {
        let upstream = RecordingUpstream::ok(r#"{"symbol":"BTCUSDT","price":"67000.01"}"#);
        let calls = upstream.calls();
        let state = test_state(upstream, 1_700_000_000_000);

        let result = handle_proxy(
            State(state),
            request(serde_json::json!({
                "apiKey": "K",
                "endpoint": "/api/v3/ticker/price",
                "params": {"symbol": "BTCUSDT"}
            })),
        )
        .await;
        let (status, body) = into_parts(result).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"symbol": "BTCUSDT", "price": "67000.01"}));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT"
        );
        assert_eq!(calls[0].1, "K");
    }

    /// 認証付きエンドポイント: 固定時刻Tで `timestamp=T&signature=...` を付与
    #[tokio::test]
    async fn test_authenticated_endpoint_is_signed() {
        let t: i64 = 1_712_345_678_901;
        let upstream = RecordingUpstream::ok(r#"{"balances":[]}"#);
        let calls = upstream.calls();
        let state = test_state(upstream, t);

        let result = handle_proxy(
            State(state),
            request(serde_json::json!({
                "apiKey": "K",
                "secretKey": "S",
                "endpoint": "/api/v3/account",
                "params": {}
            })),
        )
        .await;
        let (status, body) = into_parts(result).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"balances": []}));

        let signature = hmac_sha256_hex("S", &format!("timestamp={t}")).unwrap();
        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            format!("https://api.binance.com/api/v3/account?timestamp={t}&signature={signature}")
        );
    }

    /// 認証付きでsecretKeyなし: 400、上流は呼ばれない
    #[tokio::test]
    async fn test_authenticated_without_secret_makes_no_call() {
        let upstream = RecordingUpstream::ok("{}");
        let calls = upstream.calls();
        let state = test_state(upstream, 0);

        let result = handle_proxy(
            State(state),
            request(serde_json::json!({"apiKey": "K", "endpoint": "/api/v3/allOrders"})),
        )
        .await;
        let (status, body) = into_parts(result).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"error": "Secret Key es requerido para endpoint autenticado"})
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    /// apiKey / endpoint 欠落: 400、上流は呼ばれない
    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        for json in [
            serde_json::json!({"endpoint": "/api/v3/time"}),
            serde_json::json!({"apiKey": "K"}),
            serde_json::json!({}),
        ] {
            let upstream = RecordingUpstream::ok("{}");
            let calls = upstream.calls();
            let state = test_state(upstream, 0);

            let (status, body) = into_parts(handle_proxy(State(state), request(json)).await).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({"error": "API Key y endpoint son requeridos"}));
            assert!(calls.lock().unwrap().is_empty());
        }
    }

    /// 上流のエラーステータスは常に400に平坦化される
    #[tokio::test]
    async fn test_upstream_failure_is_flattened() {
        for (upstream_status, body, expected_error) in [
            (418, r#"{"code":-1003,"msg":"Way too many requests"}"#, "Error de Binance: Way too many requests"),
            (503, "Service Unavailable", "Error de Binance: Service Unavailable"),
            (401, r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#, "Error de Binance: Invalid API-key, IP, or permissions for action."),
        ] {
            let state = test_state(RecordingUpstream::with_status(upstream_status, body), 0);
            let result = handle_proxy(
                State(state),
                request(serde_json::json!({"apiKey": "K", "endpoint": "/api/v3/depth"})),
            )
            .await;
            let (status, body) = into_parts(result).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                serde_json::json!({"error": expected_error, "status": upstream_status})
            );
        }
    }

    /// 通信エラーは500 + timestamp
    #[tokio::test]
    async fn test_upstream_unreachable_is_500() {
        let state = test_state(RecordingUpstream::unreachable("error sending request"), 0);
        let result = handle_proxy(
            State(state),
            request(serde_json::json!({"apiKey": "K", "endpoint": "/api/v3/time"})),
        )
        .await;
        let (status, body) = into_parts(result).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "error sending request");
        assert!(body["timestamp"].as_str().is_some());
    }

    /// 成功ステータスでもJSONでなければ500
    #[tokio::test]
    async fn test_upstream_non_json_success_is_500() {
        let state = test_state(RecordingUpstream::ok("not json"), 0);
        let result = handle_proxy(
            State(state),
            request(serde_json::json!({"apiKey": "K", "endpoint": "/api/v3/time"})),
        )
        .await;
        let (status, body) = into_parts(result).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Respuesta inválida de Binance"));
    }
}
