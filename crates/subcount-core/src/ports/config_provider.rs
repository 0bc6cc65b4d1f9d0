//! WidgetConfigProvider port - ホストの設定ストア
//!
//! ホストは `{ configs: { providerConfig } }` を返します。
//! 取得に失敗した場合、ウィジェットは ConfigError 状態で止まります。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;
use crate::domain::ids::WidgetId;
use crate::domain::query::ProviderConfig;

/// Configuration document stored by the host for one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfiguration {
    pub configs: WidgetConfigs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfigs {
    pub provider_config: ProviderConfig,
}

impl WidgetConfiguration {
    pub fn new(provider_config: ProviderConfig) -> Self {
        Self {
            configs: WidgetConfigs { provider_config },
        }
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.configs.provider_config
    }

    pub fn into_provider_config(self) -> ProviderConfig {
        self.configs.provider_config
    }
}

#[async_trait]
pub trait WidgetConfigProvider: Send + Sync {
    async fn get_widget_configuration(
        &self,
        widget_id: &WidgetId,
    ) -> Result<WidgetConfiguration, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configuration_reads_host_shape() {
        let raw = json!({
            "configs": {
                "providerConfig": {
                    "configs": { "config": { "queryData": { "totalQuery": "t", "weekQuery": "w" } } }
                }
            }
        });
        let cfg: WidgetConfiguration = serde_json::from_value(raw).unwrap();
        assert!(cfg.provider_config().validate().is_ok());
    }
}
