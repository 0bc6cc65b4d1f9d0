//! WidgetBuilder - ウィジェットの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）：必須ポートが欠けていれば build() で失敗
//! - 省略可能なポートにはデフォルトを入れる（SystemClock, SystemLocaleDetector, UlidGenerator）

use std::sync::Arc;

use crate::app::widget::{SubscriptionsWidget, WidgetPorts, WidgetProps};
use crate::impls::SystemLocaleDetector;
use crate::ports::{
    ChannelManager, Clock, IdGenerator, LocaleDetector, LocaleSource, SystemClock, UlidGenerator,
    WidgetConfigProvider,
};

/// WidgetBuilder はウィジェットを構築
///
/// # 使用例
/// ```ignore
/// let widget = WidgetBuilder::new()
///     .props(WidgetProps::new(WidgetId::new(WIDGET_NAME)))
///     .config_provider(Arc::new(provider))
///     .channel_manager(Arc::new(channel))
///     .locale_source(Arc::new(locales))
///     .build()?;
/// let mounted = widget.mount();
/// ```
#[derive(Default)]
pub struct WidgetBuilder {
    props: Option<WidgetProps>,
    config_provider: Option<Arc<dyn WidgetConfigProvider>>,
    channel: Option<Arc<dyn ChannelManager>>,
    locale_source: Option<Arc<dyn LocaleSource>>,
    locale_detector: Option<Arc<dyn LocaleDetector>>,
    clock: Option<Arc<dyn Clock>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はウィジェット構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing widget parts: {0:?}. These must be provided before build().")]
    MissingParts(Vec<&'static str>),
}

impl WidgetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn props(mut self, props: WidgetProps) -> Self {
        self.props = Some(props);
        self
    }

    pub fn config_provider(mut self, provider: Arc<dyn WidgetConfigProvider>) -> Self {
        self.config_provider = Some(provider);
        self
    }

    pub fn channel_manager(mut self, channel: Arc<dyn ChannelManager>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn locale_source(mut self, source: Arc<dyn LocaleSource>) -> Self {
        self.locale_source = Some(source);
        self
    }

    pub fn locale_detector(mut self, detector: Arc<dyn LocaleDetector>) -> Self {
        self.locale_detector = Some(detector);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// # 検証
    /// - props, config_provider, channel_manager, locale_source は必須
    /// - 不足があれば BuildError::MissingParts を返す
    pub fn build(self) -> Result<SubscriptionsWidget, BuildError> {
        let (Some(props), Some(config_provider), Some(channel), Some(locale_source)) = (
            self.props.clone(),
            self.config_provider.clone(),
            self.channel.clone(),
            self.locale_source.clone(),
        ) else {
            return Err(BuildError::MissingParts(self.missing_parts()));
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let id_generator = self
            .id_generator
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())) as Arc<dyn IdGenerator>);
        let locale_detector = self
            .locale_detector
            .unwrap_or_else(|| Arc::new(SystemLocaleDetector) as Arc<dyn LocaleDetector>);

        Ok(SubscriptionsWidget::new(
            props,
            WidgetPorts {
                config_provider,
                channel,
                locale_source,
                locale_detector,
                clock,
                id_generator,
            },
        ))
    }

    fn missing_parts(&self) -> Vec<&'static str> {
        [
            ("props", self.props.is_none()),
            ("config_provider", self.config_provider.is_none()),
            ("channel_manager", self.channel.is_none()),
            ("locale_source", self.locale_source.is_none()),
        ]
        .into_iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| name)
        .collect()
    }
}
