//! State - パイプラインの状態とウィジェットの表示状態
//!
//! # 状態遷移
//! - AwaitingConfig → AwaitingTotal: 設定取得成功、total クエリを dispatch
//! - AwaitingConfig → ConfigError: 設定取得失敗（終端、以降クエリなし）
//! - AwaitingTotal → AwaitingWeek: total 結果受信、week クエリを dispatch
//! - AwaitingWeek → Done: week 結果受信

use serde::Serialize;

use super::count::DisplayCount;
use super::locale::MessageCatalog;
use super::query::QueryKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    AwaitingConfig,
    AwaitingTotal,
    AwaitingWeek,
    Done,
    ConfigError,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::ConfigError)
    }

    /// The query whose result this state is waiting for.
    pub fn awaiting(self) -> Option<QueryKind> {
        match self {
            Self::AwaitingTotal => Some(QueryKind::Total),
            Self::AwaitingWeek => Some(QueryKind::Week),
            _ => None,
        }
    }
}

/// Everything the renderer needs from one widget instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDisplayState {
    pub total_count: DisplayCount,
    pub week_count: DisplayCount,
    pub locale_messages: Option<MessageCatalog>,
    pub configuration_error: bool,
    pub pipeline: PipelineState,
}

impl WidgetDisplayState {
    /// The catalog is the render gate: nothing but a spinner until it loads.
    pub fn is_loading(&self) -> bool {
        self.locale_messages.is_none()
    }
}
