//! Render - 表示状態からビューモデルへ
//!
//! 1. カタログ未ロード → Loading
//! 2. 設定エラー → ローカライズされたエラーパネル
//! 3. それ以外 → 件数表示コンポーネントへ渡す props

use serde::Serialize;

use crate::domain::count::DisplayCount;
use crate::domain::locale::LocaleTag;
use crate::domain::state::WidgetDisplayState;

pub const CONFIG_ERROR_HEADING_ID: &str = "config.error.heading";
pub const CONFIG_ERROR_HEADING: &str = "Configuration Error !";
pub const CONFIG_ERROR_BODY_ID: &str = "config.error.body";
pub const CONFIG_ERROR_BODY: &str =
    "Cannot fetch provider configuration for APIM Subscriptions widget";

/// Props of the presentational count component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionsProps {
    pub theme_name: String,
    pub total_count: DisplayCount,
    pub week_count: DisplayCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderOutput {
    Loading,
    ConfigurationError {
        locale: LocaleTag,
        heading: String,
        body: String,
    },
    Subscriptions {
        locale: LocaleTag,
        props: SubscriptionsProps,
    },
}

pub fn render(state: &WidgetDisplayState, locale: &LocaleTag, theme_name: &str) -> RenderOutput {
    let Some(messages) = &state.locale_messages else {
        return RenderOutput::Loading;
    };

    if state.configuration_error {
        return RenderOutput::ConfigurationError {
            locale: locale.clone(),
            heading: messages.text(CONFIG_ERROR_HEADING_ID, CONFIG_ERROR_HEADING),
            body: messages.text(CONFIG_ERROR_BODY_ID, CONFIG_ERROR_BODY),
        };
    }

    RenderOutput::Subscriptions {
        locale: locale.clone(),
        props: SubscriptionsProps {
            theme_name: theme_name.to_string(),
            total_count: state.total_count.clone(),
            week_count: state.week_count.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::locale::MessageCatalog;
    use serde_json::json;

    fn en() -> LocaleTag {
        LocaleTag::from_language("en")
    }

    #[test]
    fn missing_catalog_renders_loading_even_on_error() {
        let state = WidgetDisplayState {
            configuration_error: true,
            ..WidgetDisplayState::default()
        };
        assert_eq!(render(&state, &en(), "dark"), RenderOutput::Loading);
    }

    #[test]
    fn configuration_error_uses_catalog_text() {
        let state = WidgetDisplayState {
            configuration_error: true,
            locale_messages: Some(
                MessageCatalog::default().with_message(CONFIG_ERROR_HEADING_ID, "Erreur !"),
            ),
            ..WidgetDisplayState::default()
        };

        let RenderOutput::ConfigurationError { heading, body, .. } = render(&state, &en(), "dark")
        else {
            panic!("expected error panel");
        };
        assert_eq!(heading, "Erreur !");
        assert_eq!(body, CONFIG_ERROR_BODY);
    }

    #[test]
    fn counts_are_passed_to_the_view() {
        let state = WidgetDisplayState {
            total_count: DisplayCount::Text("05".to_string()),
            week_count: DisplayCount::Number(15.into()),
            locale_messages: Some(MessageCatalog::default().with_message("a.b", "x")),
            ..WidgetDisplayState::default()
        };

        let out = serde_json::to_value(render(&state, &en(), "light")).unwrap();
        assert_eq!(
            out,
            json!({
                "view": "subscriptions",
                "locale": "en",
                "props": { "themeName": "light", "totalCount": "05", "weekCount": 15 }
            })
        );
    }
}
