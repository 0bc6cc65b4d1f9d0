//! SubscriptionPipeline - total → week の 2 段クエリ
//!
//! # 学習ポイント
//! - 状態機械を純粋関数として書く（current_state + observation → effects）
//! - 副作用（subscribe / unsubscribe）は Effect として返し、実行はウィジェット側
//!
//! # 順序保証
//! total と week は同じ購読スロットを使うので、week の dispatch は
//! total の結果（値あり・なし）を受け取った後にしか出しません。

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::domain::count::{DisplayCount, format_count};
use crate::domain::errors::ConfigError;
use crate::domain::query::{self, DispatchPayload, ProviderConfig, QueryKind, TemplateError};
use crate::domain::result::QueryResult;
use crate::domain::state::PipelineState;

/// Side effect requested by a transition, executed against the channel manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Subscribe a fresh one-shot handler and send the payload.
    Dispatch(DispatchPayload),
    /// Drop the handler currently held by this widget.
    Unsubscribe,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionPipeline {
    state: PipelineState,
    provider_config: Option<ProviderConfig>,
    total_count: DisplayCount,
    week_count: DisplayCount,
}

impl SubscriptionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn total_count(&self) -> &DisplayCount {
        &self.total_count
    }

    pub fn week_count(&self) -> &DisplayCount {
        &self.week_count
    }

    /// AwaitingConfig → AwaitingTotal.
    ///
    /// Both templates are checked here so that a broken configuration ends in
    /// `ConfigError` before any query leaves the widget.
    pub fn on_config_loaded(&mut self, config: ProviderConfig) -> Result<Vec<Effect>, ConfigError> {
        if self.state != PipelineState::AwaitingConfig {
            debug!(state = ?self.state, "configuration ignored, pipeline already started");
            return Ok(Vec::new());
        }

        let total = config.validate().and_then(|()| config.total_payload());
        match total {
            Ok(payload) => {
                self.provider_config = Some(config);
                self.state = PipelineState::AwaitingTotal;
                Ok(vec![Effect::Dispatch(payload)])
            }
            Err(err) => {
                self.state = PipelineState::ConfigError;
                Err(err.into())
            }
        }
    }

    /// AwaitingConfig → ConfigError. Terminal.
    pub fn on_config_failed(&mut self) {
        if self.state == PipelineState::AwaitingConfig {
            self.state = PipelineState::ConfigError;
        }
    }

    /// Handle the result of the query `kind`.
    ///
    /// Results for a step the pipeline is not waiting on are ignored. An
    /// empty result leaves the stored count untouched but still advances.
    pub fn on_result(
        &mut self,
        kind: QueryKind,
        result: &QueryResult,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<Effect>, TemplateError> {
        if self.state.awaiting() != Some(kind) {
            debug!(state = ?self.state, query = %kind, "unexpected result ignored");
            return Ok(Vec::new());
        }

        let formatted = result.first_scalar().map(format_count);
        match kind {
            QueryKind::Total => {
                let week = self
                    .provider_config
                    .as_ref()
                    .ok_or(TemplateError::MissingQueryData)?
                    .week_payload(query::week_start(now))?;
                if let Some(count) = formatted {
                    self.total_count = count;
                }
                self.state = PipelineState::AwaitingWeek;
                Ok(vec![Effect::Unsubscribe, Effect::Dispatch(week)])
            }
            QueryKind::Week => {
                if let Some(count) = formatted {
                    self.week_count = count;
                }
                // the week handler stays subscribed until unmount
                self.state = PipelineState::Done;
                Ok(Vec::new())
            }
        }
    }
}
