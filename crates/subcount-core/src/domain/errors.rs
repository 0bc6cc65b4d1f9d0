//! Errors - エラー型と分類
//!
//! 利用者に見えるのは 2 種類だけです。
//! - Configuration: エラーパネルを表示し、パイプラインを停止
//! - LocaleLoad: ログのみ、ウィジェットはローディング表示のまま
//!
//! クエリ dispatch の失敗には専用の経路がありません（状態がそのまま止まる）。

use super::ids::WidgetId;
use super::query::TemplateError;

/// ErrorKind は利用者から見たエラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    LocaleLoad,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("widget configuration for '{widget_id}' is unavailable: {reason}")]
    Unavailable { widget_id: WidgetId, reason: String },

    #[error("widget configuration for '{widget_id}' could not be decoded: {source}")]
    Decode {
        widget_id: WidgetId,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocaleLoadError {
    #[error("locale bundle '{tag}' could not be fetched: {reason}")]
    Fetch { tag: String, reason: String },

    #[error("locale bundle '{tag}' request returned status {status}")]
    Status { tag: String, status: u16 },

    #[error("locale bundle '{tag}' is not a valid message catalog: {source}")]
    Decode {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LocaleLoadError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::LocaleLoad
    }
}

/// Failures raised by a channel manager. The pipeline only logs these.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel manager state is poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::QueryKind;

    #[test]
    fn errors_are_classified() {
        let config = ConfigError::Unavailable {
            widget_id: WidgetId::new("APIMSubscriptions"),
            reason: "timeout".to_string(),
        };
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert!(config.to_string().contains("APIMSubscriptions"));

        let locale = LocaleLoadError::Status {
            tag: "fr".to_string(),
            status: 404,
        };
        assert_eq!(locale.kind(), ErrorKind::LocaleLoad);
        assert!(locale.to_string().contains("404"));
    }

    #[test]
    fn template_errors_become_configuration_errors() {
        let err: ConfigError = TemplateError::MissingTemplate(QueryKind::Week).into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("weekQuery"));
    }
}
