//! Locale ports - ロケール検出とバンドル取得
//!
//! # 実装
//! - LocaleDetector: SystemLocaleDetector（OS）、FixedLocaleDetector（テスト・CLI）
//! - LocaleSource: HttpLocaleSource、DirLocaleSource、StaticLocaleSource

use async_trait::async_trait;

use crate::domain::errors::LocaleLoadError;
use crate::domain::locale::{LocaleTag, MessageCatalog};

/// Reports the runtime language, e.g. `en-US`.
pub trait LocaleDetector: Send + Sync {
    fn detect_locale(&self) -> String;
}

/// Fetches the message bundle for a tag.
#[async_trait]
pub trait LocaleSource: Send + Sync {
    async fn fetch_bundle(&self, tag: &LocaleTag) -> Result<MessageCatalog, LocaleLoadError>;
}
