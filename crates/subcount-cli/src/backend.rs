//! ScriptedBackend - 決め打ちの値を返すデータバックエンド
//!
//! ダッシュボードのデータプロバイダの代わりに、total / week クエリに対して
//! コマンドラインで指定された値を 1 行 1 列の結果として返します。

use std::sync::Arc;

use serde_json::Value;
use subcount_core::domain::{DispatchPayload, QueryKind, QueryResult};
use subcount_core::impls::Responder;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    total: Option<Value>,
    week: Option<Value>,
}

impl ScriptedBackend {
    pub fn new(total: Option<Value>, week: Option<Value>) -> Self {
        Self { total, week }
    }

    /// A missing value answers with an empty result set.
    pub fn answer(&self, payload: &DispatchPayload) -> QueryResult {
        let value = match payload.kind() {
            QueryKind::Total => &self.total,
            QueryKind::Week => &self.week,
        };
        info!(
            kind = %payload.kind(),
            query = payload.query().unwrap_or_default(),
            "backend executing query"
        );
        value.clone().map(QueryResult::single).unwrap_or_else(QueryResult::empty)
    }

    pub fn into_responder(self) -> Responder {
        Arc::new(move |payload: &DispatchPayload| Some(self.answer(payload)))
    }
}

/// Parse a count given on the command line. Anything that is not JSON is kept as a string.
pub fn parse_scalar(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}
