//! # 時刻ソース
//!
//! 署名の `timestamp` を決定する時刻を抽象化する。テストでは固定時刻を注入する。

use chrono::{DateTime, Utc};

/// 現在時刻の取得元。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// エポックからのミリ秒。
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// システム時計。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 常に同じ時刻を返す時計（テスト用）。
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
