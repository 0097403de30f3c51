//! # reqwestによる上流クライアント実装

use std::time::Duration;

use axum::http::header::{CONTENT_TYPE, USER_AGENT};

use super::{Upstream, UpstreamResponse, API_KEY_HEADER};
use crate::error::RelayError;

/// reqwestで上流を呼び出すクライアント。
pub struct HttpUpstream {
    client: reqwest::Client,
    /// 全リクエストに付与する固定User-Agent
    user_agent: String,
}

impl HttpUpstream {
    /// `timeout` がNoneの場合はタイムアウトなし。
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Upstream for HttpUpstream {
    async fn get(&self, url: &str, api_key: &str) -> Result<UpstreamResponse, RelayError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::UpstreamUnreachable(format!(
                        "Tiempo de espera agotado al contactar Binance: {e}"
                    ))
                } else {
                    RelayError::UpstreamUnreachable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}
