//! Configuration providers: in-memory map and JSON file.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::ConfigError;
use crate::domain::ids::WidgetId;
use crate::ports::{WidgetConfigProvider, WidgetConfiguration};

/// Holds configurations in memory. Unknown widgets fail with `Unavailable`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    configs: HashMap<WidgetId, WidgetConfiguration>,
}

impl StaticConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(mut self, widget_id: WidgetId, config: WidgetConfiguration) -> Self {
        self.configs.insert(widget_id, config);
        self
    }
}

#[async_trait]
impl WidgetConfigProvider for StaticConfigProvider {
    async fn get_widget_configuration(
        &self,
        widget_id: &WidgetId,
    ) -> Result<WidgetConfiguration, ConfigError> {
        self.configs
            .get(widget_id)
            .cloned()
            .ok_or_else(|| ConfigError::Unavailable {
                widget_id: widget_id.clone(),
                reason: "no configuration registered".to_string(),
            })
    }
}

/// Reads `{ "configs": { "providerConfig": ... } }` from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WidgetConfigProvider for FileConfigProvider {
    async fn get_widget_configuration(
        &self,
        widget_id: &WidgetId,
    ) -> Result<WidgetConfiguration, ConfigError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ConfigError::Unavailable {
                widget_id: widget_id.clone(),
                reason: format!("{}: {e}", self.path.display()),
            })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Decode {
            widget_id: widget_id.clone(),
            source,
        })
    }
}
