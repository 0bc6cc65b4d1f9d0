//! SubscriptionsWidget - ウィジェットのライフサイクル
//!
//! # フロー
//! 1. mount: 言語タグを決め、ロケールバンドルと設定の取得を並行で開始
//! 2. イベントループ（1 タスク）が結果を順番に処理し、パイプラインを進める
//! 3. 各イベントの後に表示状態を watch チャネルへ publish
//! 4. unmount: 現在の購読スロットを解除してループを止める
//!    （unmount せずに drop した場合も、ループを止めてスロットを解除する）
//!
//! ホストのリクエストはキャンセルしません。unmount 後に届いた結果は捨てられます。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::pipeline::{Effect, SubscriptionPipeline};
use crate::app::render::{RenderOutput, render};
use crate::domain::errors::{ConfigError, LocaleLoadError};
use crate::domain::ids::{DispatchId, SubscriberId, WidgetId};
use crate::domain::locale::{LocaleTag, MessageCatalog};
use crate::domain::query::QueryKind;
use crate::domain::result::QueryResult;
use crate::domain::state::{PipelineState, WidgetDisplayState};
use crate::ports::{
    ChannelManager, Clock, IdGenerator, LocaleDetector, LocaleSource, ResultHandler,
    WidgetConfigProvider, WidgetConfiguration,
};

/// Name the widget is registered under in the dashboard host.
pub const WIDGET_NAME: &str = "APIMSubscriptions";

pub const DEFAULT_THEME: &str = "dark";

/// Host-supplied props.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetProps {
    pub widget_id: WidgetId,
    pub theme_name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WidgetProps {
    pub fn new(widget_id: WidgetId) -> Self {
        Self {
            widget_id,
            theme_name: DEFAULT_THEME.to_string(),
            width: None,
            height: None,
        }
    }

    pub fn with_theme(mut self, theme_name: impl Into<String>) -> Self {
        self.theme_name = theme_name.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Host capabilities injected into the widget.
#[derive(Clone)]
pub struct WidgetPorts {
    pub config_provider: Arc<dyn WidgetConfigProvider>,
    pub channel: Arc<dyn ChannelManager>,
    pub locale_source: Arc<dyn LocaleSource>,
    pub locale_detector: Arc<dyn LocaleDetector>,
    pub clock: Arc<dyn Clock>,
    pub id_generator: Arc<dyn IdGenerator>,
}

/// An unmounted widget. Build one with [`crate::app::WidgetBuilder`].
pub struct SubscriptionsWidget {
    props: WidgetProps,
    ports: WidgetPorts,
}

impl SubscriptionsWidget {
    pub fn new(props: WidgetProps, ports: WidgetPorts) -> Self {
        Self { props, ports }
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    /// Start the widget. Must be called from within a tokio runtime.
    pub fn mount(self) -> MountedWidget {
        let Self { props, ports } = self;
        let subscriber_id = ports.id_generator.generate_subscriber_id();
        let locale = LocaleTag::from_language(&ports.locale_detector.detect_locale());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(WidgetDisplayState::default());

        info!(
            widget_id = %props.widget_id,
            %subscriber_id,
            %locale,
            "mounting widget"
        );

        spawn_locale_load(ports.locale_source.clone(), locale.clone(), ports.channel.clone(), events_tx.clone());
        spawn_config_load(
            ports.config_provider.clone(),
            props.widget_id.clone(),
            events_tx.clone(),
        );

        let channel = ports.channel.clone();
        let event_loop = WidgetLoop {
            widget_id: props.widget_id.clone(),
            subscriber_id,
            ports,
            pipeline: SubscriptionPipeline::new(),
            state_tx,
            events_tx: events_tx.clone(),
            events_rx,
        };
        let task = tokio::spawn(event_loop.run());

        MountedWidget {
            props,
            subscriber_id,
            locale,
            channel,
            events: events_tx,
            state: state_rx,
            task: Some(task),
        }
    }
}

/// A running widget instance.
pub struct MountedWidget {
    props: WidgetProps,
    subscriber_id: SubscriberId,
    locale: LocaleTag,
    channel: Arc<dyn ChannelManager>,
    events: mpsc::UnboundedSender<WidgetEvent>,
    state: watch::Receiver<WidgetDisplayState>,
    task: Option<JoinHandle<()>>,
}

impl MountedWidget {
    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    pub fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    /// Snapshot of the current display state.
    pub fn state(&self) -> WidgetDisplayState {
        self.state.borrow().clone()
    }

    pub fn render(&self) -> RenderOutput {
        render(&self.state(), &self.locale, &self.props.theme_name)
    }

    /// Wait until the display state satisfies `predicate`.
    ///
    /// Returns `None` if the widget stopped first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&WidgetDisplayState) -> bool,
    ) -> Option<WidgetDisplayState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(predicate).await.ok()?;
        Some(WidgetDisplayState::clone(&state))
    }

    /// Release the channel slot and stop the event loop.
    pub async fn unmount(mut self) {
        if self.events.send(WidgetEvent::Unmount).is_err() {
            debug!(subscriber_id = %self.subscriber_id, "event loop already stopped");
        }
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(subscriber_id = %self.subscriber_id, error = %err, "widget event loop join failed");
        }
    }
}

impl Drop for MountedWidget {
    fn drop(&mut self) {
        // dropped without unmount(): the loop never released the slot
        if let Some(task) = self.task.take() {
            task.abort();
            if let Err(err) = self.channel.unsubscribe_widget(self.subscriber_id) {
                warn!(subscriber_id = %self.subscriber_id, error = %err, "unsubscribe on drop failed");
            }
        }
    }
}

enum WidgetEvent {
    Locale(Result<MessageCatalog, LocaleLoadError>),
    Configuration(Result<WidgetConfiguration, ConfigError>),
    QueryResult {
        kind: QueryKind,
        dispatch_id: DispatchId,
        result: QueryResult,
    },
    Unmount,
}

fn spawn_locale_load(
    source: Arc<dyn LocaleSource>,
    locale: LocaleTag,
    channel: Arc<dyn ChannelManager>,
    events: mpsc::UnboundedSender<WidgetEvent>,
) {
    tokio::spawn(async move {
        let bundle = source.fetch_bundle(&locale).await;
        if events.send(WidgetEvent::Locale(bundle)).is_err() {
            debug!(%locale, "widget unmounted before locale bundle arrived");
        }
    });
}

fn spawn_config_load(
    provider: Arc<dyn WidgetConfigProvider>,
    widget_id: WidgetId,
    events: mpsc::UnboundedSender<WidgetEvent>,
) {
    tokio::spawn(async move {
        let config = provider.get_widget_configuration(&widget_id).await;
        if events.send(WidgetEvent::Configuration(config)).is_err() {
            debug!(%widget_id, "widget unmounted before configuration arrived");
        }
    });
}

struct WidgetLoop {
    widget_id: WidgetId,
    subscriber_id: SubscriberId,
    ports: WidgetPorts,
    pipeline: SubscriptionPipeline,
    state_tx: watch::Sender<WidgetDisplayState>,
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
}

impl WidgetLoop {
    async fn run(mut self) {
        while let Some(event) = self.events_rx.recv().await {
            match event {
                WidgetEvent::Locale(Ok(catalog)) => {
                    info!(messages = catalog.len(), "locale bundle loaded");
                    self.state_tx
                        .send_modify(|state| state.locale_messages = Some(catalog));
                }
                WidgetEvent::Locale(Err(err)) => {
                    error!(kind = ?err.kind(), error = %err, "failed to load locale bundle");
                }
                WidgetEvent::Configuration(Ok(config)) => {
                    match self.pipeline.on_config_loaded(config.into_provider_config()) {
                        Ok(effects) => self.apply(effects),
                        Err(err) => self.log_config_error(&err),
                    }
                    self.publish();
                }
                WidgetEvent::Configuration(Err(err)) => {
                    self.log_config_error(&err);
                    self.pipeline.on_config_failed();
                    self.publish();
                }
                WidgetEvent::QueryResult {
                    kind,
                    dispatch_id,
                    result,
                } => {
                    debug!(%dispatch_id, query = %kind, rows = result.data.len(), "count result received");
                    let now = self.ports.clock.now();
                    match self.pipeline.on_result(kind, &result, now) {
                        Ok(effects) => self.apply(effects),
                        Err(err) => warn!(%dispatch_id, error = %err, "week query could not be built"),
                    }
                    self.publish();
                }
                WidgetEvent::Unmount => {
                    self.unsubscribe();
                    break;
                }
            }
        }
        debug!(subscriber_id = %self.subscriber_id, "widget event loop stopped");
    }

    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Unsubscribe => self.unsubscribe(),
                Effect::Dispatch(payload) => {
                    let kind = payload.kind();
                    let dispatch_id = self.ports.id_generator.generate_dispatch_id();
                    info!(
                        subscriber_id = %self.subscriber_id,
                        %dispatch_id,
                        query = %kind,
                        "dispatching count query"
                    );
                    let handler = self.result_handler(kind, dispatch_id);
                    if let Err(err) =
                        self.ports
                            .channel
                            .subscribe_widget(self.subscriber_id, handler, payload)
                    {
                        warn!(%dispatch_id, error = %err, "count query dispatch failed");
                    }
                }
            }
        }
    }

    fn result_handler(&self, kind: QueryKind, dispatch_id: DispatchId) -> ResultHandler {
        let events = self.events_tx.clone();
        Arc::new(move |result| {
            let event = WidgetEvent::QueryResult {
                kind,
                dispatch_id,
                result,
            };
            if events.send(event).is_err() {
                debug!(%dispatch_id, "result arrived after unmount");
            }
        })
    }

    fn unsubscribe(&self) {
        if let Err(err) = self.ports.channel.unsubscribe_widget(self.subscriber_id) {
            warn!(subscriber_id = %self.subscriber_id, error = %err, "unsubscribe failed");
        }
    }

    fn log_config_error(&self, err: &ConfigError) {
        error!(
            widget_id = %self.widget_id,
            kind = ?err.kind(),
            error = %err,
            "error occurred when loading widget"
        );
    }

    fn publish(&self) {
        let pipeline = &self.pipeline;
        self.state_tx.send_modify(|state| {
            state.total_count = pipeline.total_count().clone();
            state.week_count = pipeline.week_count().clone();
            state.pipeline = pipeline.state();
            state.configuration_error = pipeline.state() == PipelineState::ConfigError;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::WidgetBuilder;
    use crate::app::render::SubscriptionsProps;
    use crate::domain::count::DisplayCount;
    use crate::domain::query::ProviderConfig;
    use crate::impls::{
        FixedLocaleDetector, InMemoryChannelManager, StaticConfigProvider, StaticLocaleSource,
    };
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    fn provider_config() -> ProviderConfig {
        ProviderConfig::new(json!({
            "configs": { "config": { "queryData": {
                "totalQuery": "from SubscriptionSummary select count(subscriptionId) as count",
                "weekQuery": "from SubscriptionSummary on createdTime > '{{weekStart}}' select count(subscriptionId) as count",
                "query": ""
            } } }
        }))
    }

    fn english() -> MessageCatalog {
        MessageCatalog::default().with_message("a.b", "label")
    }

    struct Harness {
        widget: MountedWidget,
        channel: InMemoryChannelManager,
    }

    fn mount(config: Option<ProviderConfig>, locales: StaticLocaleSource) -> Harness {
        let widget_id = WidgetId::new(WIDGET_NAME);
        let mut provider = StaticConfigProvider::new();
        if let Some(config) = config {
            provider = provider.with_configuration(widget_id.clone(), WidgetConfiguration::new(config));
        }
        let channel = InMemoryChannelManager::new();
        let widget = WidgetBuilder::new()
            .props(WidgetProps::new(widget_id).with_theme("light"))
            .config_provider(Arc::new(provider))
            .channel_manager(Arc::new(channel.clone()))
            .locale_source(Arc::new(locales))
            .locale_detector(Arc::new(FixedLocaleDetector::new("en-US")))
            .clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            )))
            .build()
            .unwrap()
            .mount();
        Harness { widget, channel }
    }

    fn with_english() -> StaticLocaleSource {
        StaticLocaleSource::new().with_bundle(LocaleTag::from_language("en"), english())
    }

    async fn wait_for_pipeline(widget: &MountedWidget, target: PipelineState) -> WidgetDisplayState {
        tokio::time::timeout(WAIT, widget.wait_until(|s| s.pipeline == target))
            .await
            .expect("timed out waiting for pipeline state")
            .expect("widget stopped")
    }

    #[tokio::test]
    async fn counts_flow_through_both_queries() {
        let Harness { widget, channel } = mount(Some(provider_config()), with_english());
        let sub = widget.subscriber_id();

        wait_for_pipeline(&widget, PipelineState::AwaitingTotal).await;
        assert!(channel.deliver(sub, QueryResult::single(5)).unwrap());

        wait_for_pipeline(&widget, PipelineState::AwaitingWeek).await;
        let week = channel.active_payload(sub).unwrap();
        assert_eq!(week.kind(), QueryKind::Week);
        assert!(week.query().unwrap().contains("2024-01-08 00:00:00.000000000"));
        assert!(channel.deliver(sub, QueryResult::single(15)).unwrap());

        let state = wait_for_pipeline(&widget, PipelineState::Done).await;
        assert_eq!(state.total_count, DisplayCount::Text("05".to_string()));
        assert_eq!(state.week_count, DisplayCount::Number(15.into()));

        tokio::time::timeout(WAIT, widget.wait_until(|s| !s.is_loading()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            widget.render(),
            RenderOutput::Subscriptions {
                locale: LocaleTag::from_language("en"),
                props: SubscriptionsProps {
                    theme_name: "light".to_string(),
                    total_count: DisplayCount::Text("05".to_string()),
                    week_count: DisplayCount::Number(15.into()),
                },
            }
        );

        // total handler was released before the week dispatch, the week one stays
        assert_eq!(channel.unsubscribe_count(sub), 1);
        assert!(channel.is_subscribed(sub));
        widget.unmount().await;
        assert_eq!(channel.unsubscribe_count(sub), 2);
        assert!(!channel.is_subscribed(sub));
    }

    #[tokio::test]
    async fn dropping_without_unmount_releases_the_slot() {
        let Harness { widget, channel } = mount(Some(provider_config()), with_english());
        let sub = widget.subscriber_id();

        wait_for_pipeline(&widget, PipelineState::AwaitingTotal).await;
        assert!(channel.is_subscribed(sub));

        drop(widget);
        assert!(!channel.is_subscribed(sub));
        assert_eq!(channel.unsubscribe_count(sub), 1);
        assert!(!channel.deliver(sub, QueryResult::single(5)).unwrap());
    }

    #[tokio::test]
    async fn configuration_failure_never_dispatches() {
        let Harness { widget, channel } = mount(None, with_english());

        let state = wait_for_pipeline(&widget, PipelineState::ConfigError).await;
        assert!(state.configuration_error);
        assert!(channel.dispatched().is_empty());

        tokio::time::timeout(WAIT, widget.wait_until(|s| !s.is_loading()))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            widget.render(),
            RenderOutput::ConfigurationError { .. }
        ));
        widget.unmount().await;
    }

    #[tokio::test]
    async fn empty_total_still_dispatches_week() {
        let Harness { widget, channel } = mount(Some(provider_config()), with_english());
        let sub = widget.subscriber_id();

        wait_for_pipeline(&widget, PipelineState::AwaitingTotal).await;
        channel.deliver(sub, QueryResult::empty()).unwrap();

        let state = wait_for_pipeline(&widget, PipelineState::AwaitingWeek).await;
        assert_eq!(state.total_count, DisplayCount::default());

        let kinds: Vec<QueryKind> = channel.dispatched().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![QueryKind::Total, QueryKind::Week]);
        widget.unmount().await;
    }

    #[tokio::test]
    async fn locale_failure_keeps_widget_loading() {
        let Harness { widget, channel } =
            mount(Some(provider_config()), StaticLocaleSource::new());
        let sub = widget.subscriber_id();

        wait_for_pipeline(&widget, PipelineState::AwaitingTotal).await;
        channel.deliver(sub, QueryResult::single(3)).unwrap();
        wait_for_pipeline(&widget, PipelineState::AwaitingWeek).await;
        channel.deliver(sub, QueryResult::single(4)).unwrap();
        let state = wait_for_pipeline(&widget, PipelineState::Done).await;

        assert!(state.is_loading());
        assert_eq!(widget.render(), RenderOutput::Loading);
        widget.unmount().await;
    }

    #[tokio::test]
    async fn responder_backend_completes_without_manual_delivery() {
        let widget_id = WidgetId::new(WIDGET_NAME);
        let channel = InMemoryChannelManager::with_responder(Arc::new(|p: &crate::domain::DispatchPayload| {
            Some(match p.kind() {
                QueryKind::Total => QueryResult::single(120),
                QueryKind::Week => QueryResult::single(8),
            })
        }));
        let widget = WidgetBuilder::new()
            .props(WidgetProps::new(widget_id.clone()))
            .config_provider(Arc::new(StaticConfigProvider::new().with_configuration(
                widget_id,
                WidgetConfiguration::new(provider_config()),
            )))
            .channel_manager(Arc::new(channel))
            .locale_source(Arc::new(with_english()))
            .locale_detector(Arc::new(FixedLocaleDetector::new("en")))
            .build()
            .unwrap()
            .mount();

        let state = wait_for_pipeline(&widget, PipelineState::Done).await;
        assert_eq!(state.total_count, DisplayCount::Number(120.into()));
        assert_eq!(state.week_count, DisplayCount::Text("08".to_string()));
        widget.unmount().await;
    }
}
