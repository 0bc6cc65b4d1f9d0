//! Locale bundle sources and locale detectors.
//!
//! # 実装
//! - **HttpLocaleSource**: `GET {base}/public/extensions/widgets/{widget}/locales/{tag}.json`
//! - **DirLocaleSource**: `{dir}/{tag}.json` をローカルから読む（CLI 用）
//! - **StaticLocaleSource**: メモリ上のカタログ（テスト用）
//!
//! どれもリトライ・フォールバックはしません。失敗はそのまま返します。

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::LocaleLoadError;
use crate::domain::ids::WidgetId;
use crate::domain::locale::{LocaleTag, MessageCatalog};
use crate::ports::{LocaleDetector, LocaleSource};

/// Language used when the OS does not report one.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Fetches bundles from the dashboard host's public extension path.
#[derive(Debug, Clone)]
pub struct HttpLocaleSource {
    client: reqwest::Client,
    base_path: String,
    widget: WidgetId,
}

impl HttpLocaleSource {
    pub fn new(base_path: impl Into<String>, widget: WidgetId) -> Self {
        Self::with_client(reqwest::Client::new(), base_path, widget)
    }

    pub fn with_client(client: reqwest::Client, base_path: impl Into<String>, widget: WidgetId) -> Self {
        Self {
            client,
            base_path: base_path.into(),
            widget,
        }
    }

    pub fn bundle_url(&self, tag: &LocaleTag) -> String {
        format!(
            "{}/public/extensions/widgets/{}/locales/{}.json",
            self.base_path.trim_end_matches('/'),
            self.widget,
            tag
        )
    }
}

#[async_trait]
impl LocaleSource for HttpLocaleSource {
    async fn fetch_bundle(&self, tag: &LocaleTag) -> Result<MessageCatalog, LocaleLoadError> {
        let fetch_error = |e: reqwest::Error| LocaleLoadError::Fetch {
            tag: tag.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(self.bundle_url(tag))
            .send()
            .await
            .map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocaleLoadError::Status {
                tag: tag.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(fetch_error)?;
        MessageCatalog::from_json(&bytes).map_err(|source| LocaleLoadError::Decode {
            tag: tag.to_string(),
            source,
        })
    }
}

/// Reads `{tag}.json` from a local directory.
#[derive(Debug, Clone)]
pub struct DirLocaleSource {
    dir: PathBuf,
}

impl DirLocaleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LocaleSource for DirLocaleSource {
    async fn fetch_bundle(&self, tag: &LocaleTag) -> Result<MessageCatalog, LocaleLoadError> {
        let path = self.dir.join(format!("{tag}.json"));
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| LocaleLoadError::Fetch {
                tag: tag.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;
        MessageCatalog::from_json(&bytes).map_err(|source| LocaleLoadError::Decode {
            tag: tag.to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticLocaleSource {
    bundles: HashMap<LocaleTag, MessageCatalog>,
}

impl StaticLocaleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, tag: LocaleTag, catalog: MessageCatalog) -> Self {
        self.bundles.insert(tag, catalog);
        self
    }
}

#[async_trait]
impl LocaleSource for StaticLocaleSource {
    async fn fetch_bundle(&self, tag: &LocaleTag) -> Result<MessageCatalog, LocaleLoadError> {
        self.bundles
            .get(tag)
            .cloned()
            .ok_or_else(|| LocaleLoadError::Status {
                tag: tag.to_string(),
                status: 404,
            })
    }
}

/// OS locale via `sys-locale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocaleDetector;

impl LocaleDetector for SystemLocaleDetector {
    fn detect_locale(&self) -> String {
        sys_locale::get_locale().unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FixedLocaleDetector(String);

impl FixedLocaleDetector {
    pub fn new(language: impl Into<String>) -> Self {
        Self(language.into())
    }
}

impl LocaleDetector for FixedLocaleDetector {
    fn detect_locale(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_url_follows_extension_layout() {
        let source = HttpLocaleSource::new("/portal/", WidgetId::new("APIMSubscriptions"));
        let url = source.bundle_url(&LocaleTag::from_language("en-US"));
        assert_eq!(
            url,
            "/portal/public/extensions/widgets/APIMSubscriptions/locales/en.json"
        );
    }

    #[tokio::test]
    async fn dir_source_reads_tag_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fr.json"),
            r#"{ "config.error.heading": { "defaultMessage": "Erreur !" } }"#,
        )
        .unwrap();
        let source = DirLocaleSource::new(dir.path());

        let catalog = source
            .fetch_bundle(&LocaleTag::from_language("fr-CA"))
            .await
            .unwrap();
        assert_eq!(catalog.text("config.error.heading", ""), "Erreur !");

        let missing = source.fetch_bundle(&LocaleTag::from_language("de")).await;
        assert!(matches!(missing, Err(LocaleLoadError::Fetch { .. })));
    }

    #[tokio::test]
    async fn dir_source_rejects_malformed_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), "{ nope").unwrap();
        let result = DirLocaleSource::new(dir.path())
            .fetch_bundle(&LocaleTag::from_language("en"))
            .await;
        assert!(matches!(result, Err(LocaleLoadError::Decode { .. })));
    }

    #[tokio::test]
    async fn static_source_misses_with_not_found() {
        let result = StaticLocaleSource::new()
            .fetch_bundle(&LocaleTag::from_language("ja"))
            .await;
        assert!(matches!(result, Err(LocaleLoadError::Status { status: 404, .. })));
    }

    #[test]
    fn detectors_report_a_language() {
        assert_eq!(FixedLocaleDetector::new("pt-BR").detect_locale(), "pt-BR");
        assert!(!SystemLocaleDetector.detect_locale().is_empty());
    }
}
