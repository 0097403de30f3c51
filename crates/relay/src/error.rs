//! # Relay エラー型
//!
//! 全ての失敗はハンドラ境界でJSONエンベロープに変換される。
//! クライアントに見えるメッセージ（スペイン語）は既存のフロントエンドとの契約であり、変更しない。

use axum::http::StatusCode;
use axum::Json;
use binance_relay_types::{InternalErrorBody, UpstreamErrorBody, ValidationErrorBody};

/// `apiKey` または `endpoint` が欠落している場合のメッセージ
pub const MISSING_CREDENTIAL_MESSAGE: &str = "API Key y endpoint son requeridos";
/// 認証付きエンドポイントで `secretKey` が欠落している場合のメッセージ
pub const MISSING_SECRET_MESSAGE: &str = "Secret Key es requerido para endpoint autenticado";
/// 例外メッセージが空の場合のフォールバック
pub const INTERNAL_FALLBACK_MESSAGE: &str = "Error interno del servidor";

/// Relayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// apiKey / endpoint の欠落
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,
    /// 認証付きエンドポイントでsecretKeyが欠落
    #[error("{}", MISSING_SECRET_MESSAGE)]
    MissingSecret,
    /// 上流が失敗ステータスを返した
    #[error("Error de Binance: {message}")]
    UpstreamRejected {
        /// 上流の実際のHTTPステータス
        status: u16,
        /// 上流のエラーメッセージ（`msg` フィールドまたは生テキスト）
        message: String,
    },
    /// 上流への通信失敗・タイムアウト・レスポンス読み取り失敗
    #[error("{0}")]
    UpstreamUnreachable(String),
    /// paramsに変換できない値が含まれている
    #[error("{0}")]
    InvalidParameter(String),
    /// 内部エラー（リクエストボディのパース失敗、署名失敗、上流レスポンスのパース失敗）
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// クライアントに返すHTTPステータス。
    /// 上流のエラーは上流ステータスに関わらず常に400。
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingCredential
            | RelayError::MissingSecret
            | RelayError::UpstreamRejected { .. } => StatusCode::BAD_REQUEST,
            RelayError::UpstreamUnreachable(_)
            | RelayError::InvalidParameter(_)
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<binance_relay_crypto::CryptoError> for RelayError {
    fn from(e: binance_relay_crypto::CryptoError) -> Self {
        RelayError::Internal(e.to_string())
    }
}

/// 現在時刻をISO-8601（ミリ秒、`Z` 付き）で返す。
pub(crate) fn iso_timestamp(now: chrono::DateTime<chrono::Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl axum::response::IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match self {
            RelayError::MissingCredential | RelayError::MissingSecret => (
                status,
                Json(ValidationErrorBody {
                    error: self.to_string(),
                }),
            )
                .into_response(),
            RelayError::UpstreamRejected {
                status: upstream_status,
                ..
            } => (
                status,
                Json(UpstreamErrorBody {
                    error: self.to_string(),
                    status: upstream_status,
                }),
            )
                .into_response(),
            RelayError::UpstreamUnreachable(_)
            | RelayError::InvalidParameter(_)
            | RelayError::Internal(_) => {
                let message = self.to_string();
                let error = if message.is_empty() {
                    INTERNAL_FALLBACK_MESSAGE.to_string()
                } else {
                    message
                };
                (
                    status,
                    Json(InternalErrorBody {
                        error,
                        timestamp: iso_timestamp(chrono::Utc::now()),
                    }),
                )
                    .into_response()
            }
        }
    }
}
