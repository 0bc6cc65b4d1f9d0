//! Locale - 言語タグとメッセージカタログ
//!
//! ロケールバンドルは `message-id → { defaultMessage, description? }` 形式の JSON です。
//! カタログが未ロードの間、表示層はローディング表示のみを出します。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Language tag without region code (`en-US` → `en`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTag(String);

impl LocaleTag {
    /// Derive the bundle tag from a runtime language such as `en-US` or `pt_BR`.
    ///
    /// Lowercases and keeps the first `-`/`_` separated segment. When that
    /// segment is empty the input is used as given.
    pub fn from_language(language: &str) -> Self {
        let language = language.trim();
        let lowered = language.to_lowercase();
        let base = lowered.split(['-', '_']).next().unwrap_or_default();
        if base.is_empty() {
            Self(language.to_string())
        } else {
            Self(base.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of a locale bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDescriptor {
    #[serde(default)]
    pub default_message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MessageDescriptor {
    pub fn new(default_message: impl Into<String>) -> Self {
        Self {
            default_message: default_message.into(),
            description: None,
        }
    }
}

/// Parsed locale bundle: message id → descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCatalog {
    messages: BTreeMap<String, MessageDescriptor>,
}

impl MessageCatalog {
    pub fn new(messages: BTreeMap<String, MessageDescriptor>) -> Self {
        Self { messages }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn with_message(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(id.into(), MessageDescriptor::new(message));
        self
    }

    pub fn get(&self, id: &str) -> Option<&MessageDescriptor> {
        self.messages.get(id)
    }

    /// Localized text for `id`, or `default` when the bundle lacks it.
    pub fn text(&self, id: &str, default: &str) -> String {
        self.messages
            .get(id)
            .map(|m| m.default_message.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
