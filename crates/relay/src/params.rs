//! # 正規化クエリパラメータ
//!
//! 署名対象と最終URLの両方に使うクエリ文字列を構築する。
//!
//! - キーの順序は挿入順（リクエストJSONの出現順 → `timestamp` → `signature`）
//! - 既存キーへの再挿入は値のみ置き換え、位置は変えない
//! - エンコードは `application/x-www-form-urlencoded`（空白は `+`）

use serde_json::{Map, Number, Value};

use crate::error::RelayError;

/// 順序付きのクエリパラメータ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// リクエストの `params` オブジェクトから構築する。
    ///
    /// 値はブラウザの文字列化規則に合わせて変換する。ネストしたオブジェクトは拒否する。
    pub fn from_json(map: &Map<String, Value>) -> Result<Self, RelayError> {
        let mut params = Self::new();
        for (key, value) in map {
            let value = match value {
                Value::Null => "null".to_string(),
                other => stringify(key, other)?,
            };
            params.insert(key, value);
        }
        Ok(params)
    }

    /// キーが既にあれば値を置き換え、なければ末尾に追加する。
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// `key=value&...` 形式にエンコードする。空なら空文字列。
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// 値を文字列化する。配列は要素を `,` で連結（null要素は空文字列）。
fn stringify(key: &str, value: &Value) -> Result<String, RelayError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(number_to_string(n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| stringify(key, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(","))
        }
        Value::Object(_) => Err(RelayError::InvalidParameter(format!(
            "El parámetro '{key}' no puede ser un objeto"
        ))),
    }
}

/// 数値をブラウザの `String(number)` と同じ形式で出力する。
///
/// - `1.0` → `"1"`
/// - 絶対値が `1e21` 以上、または `1e-6` 未満なら指数表記（`1e-7`, `1.5e+21`）
pub(crate) fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_form(f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `{:e}` の出力に正の指数の `+` を補う。
fn exponent_form(f: f64) -> String {
    let formatted = format!("{f:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}
