//! # Relay設定・共有状態
//!
//! 環境変数からの設定読み込みとRelayの共有状態の定義。
//! 起動後は不変で、リクエスト間で共有される可変状態は持たない。

use std::time::{Duration, Instant};

use anyhow::Context;

use crate::clock::Clock;
use crate::upstream::Upstream;

/// 既定の待ち受けポート
pub const DEFAULT_PORT: u16 = 3000;
/// 既定の上流ベースURL
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.binance.com";
/// 既定のUser-Agent
pub const DEFAULT_USER_AGENT: &str = "BinanceProxy/1.0";
/// 既定の上流タイムアウト（秒）
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
/// 既定のCORS許可オリジン
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = [
    "http://localhost:5173",
    "https://invest.zionenterprise.com.co",
];

/// Relayの設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// 待ち受けポート（`0.0.0.0`）
    pub port: u16,
    /// 上流のベースURL（末尾の `/` なし）
    pub upstream_base_url: String,
    /// 上流へのUser-Agent
    pub user_agent: String,
    /// 上流呼び出しのタイムアウト。Noneなら無制限。
    pub upstream_timeout: Option<Duration>,
    /// CORS許可オリジン
    pub cors_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout: Some(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS)),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RelayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から構築する。未設定・空文字列は既定値。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORTが不正です: {v}"))?,
            None => defaults.port,
        };

        let upstream_base_url = get("UPSTREAM_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.upstream_base_url);

        let user_agent = get("UPSTREAM_USER_AGENT").unwrap_or(defaults.user_agent);

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("UPSTREAM_TIMEOUT_SECSが不正です: {v}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => defaults.upstream_timeout,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            port,
            upstream_base_url,
            user_agent,
            upstream_timeout,
            cors_origins,
        })
    }
}

/// Relayの共有状態。
pub struct RelayState {
    /// 起動時に読み込んだ設定
    pub config: RelayConfig,
    /// 上流クライアント（トレイトで抽象化）
    pub upstream: Box<dyn Upstream>,
    /// 署名用の時刻ソース
    pub clock: Box<dyn Clock>,
    /// プロセス起動時刻（/healthのuptime用）
    pub started_at: Instant,
}

impl RelayState {
    pub fn new(config: RelayConfig, upstream: Box<dyn Upstream>, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            upstream,
            clock,
            started_at: Instant::now(),
        }
    }
}
