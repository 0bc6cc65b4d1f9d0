//! subcount - API サブスクリプション件数ウィジェットをターミナルで動かす
//!
//! ダッシュボードホストの代わりに設定ストア・チャネル・ロケールを用意し、
//! ウィジェットをマウントして total → week の取得が終わるのを待ち、
//! 最終的なレンダリング結果を JSON で stdout に出力します。

mod backend;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use subcount_core::app::{DEFAULT_THEME, WIDGET_NAME, WidgetBuilder, WidgetProps, WidgetRegistry};
use subcount_core::domain::{LocaleTag, MessageCatalog, WidgetId};
use subcount_core::impls::{
    DirLocaleSource, FileConfigProvider, FixedLocaleDetector, HttpLocaleSource,
    InMemoryChannelManager, StaticConfigProvider, StaticLocaleSource,
};
use subcount_core::ports::{
    ChannelManager, LocaleDetector, LocaleSource, WidgetConfigProvider, WidgetConfiguration,
};
use tokio::time::{Duration, timeout};
use tracing::{info, warn};

use crate::backend::{ScriptedBackend, parse_scalar};
use crate::logging::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};

const SAMPLE_WIDGET_CONFIG: &str = include_str!("../assets/widget-config.json");
const SAMPLE_LOCALES: [(&str, &str); 2] = [
    ("en", include_str!("../assets/locales/en.json")),
    ("fr", include_str!("../assets/locales/fr.json")),
];

#[derive(Debug, Parser)]
#[command(
    name = "subcount",
    version,
    about = "Mount the APIM subscriptions widget against a scripted backend"
)]
struct Cli {
    /// Widget configuration document (`{"configs":{"providerConfig":...}}`); a sample is used if omitted
    #[arg(long, env = "SUBCOUNT_WIDGET_CONFIG")]
    widget_config: Option<PathBuf>,

    /// Directory holding `{lang}.json` locale bundles
    #[arg(long, env = "SUBCOUNT_LOCALES_DIR", conflicts_with = "locale_base_url")]
    locales_dir: Option<PathBuf>,

    /// Dashboard base path serving `/public/extensions/widgets/<widget>/locales/<lang>.json`
    #[arg(long, env = "SUBCOUNT_LOCALE_BASE_URL")]
    locale_base_url: Option<String>,

    /// Language tag to use instead of the OS locale (e.g. `fr-CA`)
    #[arg(long)]
    lang: Option<String>,

    /// Value the backend returns for the all-time count (JSON scalar); omitted means no rows
    #[arg(long, value_parser = parse_scalar)]
    total: Option<Value>,

    /// Value the backend returns for the trailing-week count (JSON scalar); omitted means no rows
    #[arg(long, value_parser = parse_scalar)]
    week: Option<Value>,

    #[arg(long, default_value = DEFAULT_THEME)]
    theme: String,

    /// How long to wait for the widget to settle before rendering whatever it shows
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    })?;

    let widget_id = WidgetId::new(WIDGET_NAME);
    let config_provider = config_provider(&cli, &widget_id)?;
    let locale_source = locale_source(&cli, &widget_id)?;
    let locale_detector = cli
        .lang
        .clone()
        .map(|lang| Arc::new(FixedLocaleDetector::new(lang)) as Arc<dyn LocaleDetector>);
    let channel: Arc<dyn ChannelManager> = Arc::new(InMemoryChannelManager::with_responder(
        ScriptedBackend::new(cli.total.clone(), cli.week.clone()).into_responder(),
    ));

    let mut registry = WidgetRegistry::new();
    registry.register(WIDGET_NAME, move |props: WidgetProps| {
        let builder = WidgetBuilder::new()
            .props(props)
            .config_provider(config_provider.clone())
            .channel_manager(channel.clone())
            .locale_source(locale_source.clone());
        match &locale_detector {
            Some(detector) => builder.locale_detector(detector.clone()),
            None => builder,
        }
        .build()
    })?;

    let widget = registry
        .create(WIDGET_NAME, WidgetProps::new(widget_id).with_theme(&cli.theme))?
        .mount();
    info!(subscriber_id = %widget.subscriber_id(), locale = %widget.locale(), "widget mounted");

    let settled = timeout(
        Duration::from_millis(cli.timeout_ms),
        widget.wait_until(|state| !state.is_loading() && state.pipeline.is_terminal()),
    )
    .await;
    match settled {
        Ok(Some(state)) => info!(pipeline = ?state.pipeline, "widget settled"),
        Ok(None) => warn!("widget stopped before settling"),
        Err(_) => warn!(timeout_ms = cli.timeout_ms, "widget did not settle in time"),
    }

    let output = serde_json::to_string_pretty(&widget.render())?;
    println!("{output}");

    widget.unmount().await;
    Ok(())
}

fn config_provider(cli: &Cli, widget_id: &WidgetId) -> Result<Arc<dyn WidgetConfigProvider>> {
    if let Some(path) = &cli.widget_config {
        return Ok(Arc::new(FileConfigProvider::new(path)));
    }
    let sample: WidgetConfiguration =
        serde_json::from_str(SAMPLE_WIDGET_CONFIG).context("bundled widget config is invalid")?;
    Ok(Arc::new(
        StaticConfigProvider::new().with_configuration(widget_id.clone(), sample),
    ))
}

fn locale_source(cli: &Cli, widget_id: &WidgetId) -> Result<Arc<dyn LocaleSource>> {
    if let Some(base) = &cli.locale_base_url {
        return Ok(Arc::new(HttpLocaleSource::new(base.clone(), widget_id.clone())));
    }
    if let Some(dir) = &cli.locales_dir {
        return Ok(Arc::new(DirLocaleSource::new(dir)));
    }
    let mut source = StaticLocaleSource::new();
    for (lang, bundle) in SAMPLE_LOCALES {
        let catalog = MessageCatalog::from_json(bundle.as_bytes())
            .with_context(|| format!("bundled locale '{lang}' is invalid"))?;
        source = source.with_bundle(LocaleTag::from_language(lang), catalog);
    }
    Ok(Arc::new(source))
}
