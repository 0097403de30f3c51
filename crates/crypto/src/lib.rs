//! # Binance Relay 署名処理
//!
//! 認証付きエンドポイント向けのリクエスト署名を実装する。
//!
//! ## 署名アルゴリズム
//! | 項目 | 内容 |
//! |------|------|
//! | MAC | HMAC-SHA256 |
//! | 鍵 | シークレットキーの生バイト列（再エンコードしない） |
//! | 入力 | 正規化クエリ文字列（`signature` 自身は含まない） |
//! | 出力 | 小文字16進数（64文字） |

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC-SHA256
pub type HmacSha256 = Hmac<Sha256>;

/// 署名処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// HMAC鍵の初期化に失敗
    #[error("HMAC鍵の初期化に失敗しました: {0}")]
    InvalidKey(String),
}

/// HMAC-SHA256を計算し、生のダイジェスト（32バイト）を返す。
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(message);
    let result = mac.finalize().into_bytes();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    Ok(digest)
}

/// HMAC-SHA256を計算し、小文字16進数で返す。
///
/// `secret` はUTF-8バイト列としてそのまま鍵に使う。
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String, CryptoError> {
    hmac_sha256(secret.as_bytes(), message.as_bytes()).map(hex::encode)
}
