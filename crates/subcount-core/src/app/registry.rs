//! WidgetRegistry - ウィジェット名とファクトリの登録
//!
//! ダッシュボードホストはウィジェット名（例: `APIMSubscriptions`）でウィジェットを
//! 生成します。ここではその「名前 → ファクトリ」の対応を管理します。
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - クロージャへの blanket impl（`Fn(WidgetProps) -> ...` をそのままファクトリに）

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::builder::BuildError;
use crate::app::widget::{SubscriptionsWidget, WidgetProps};

/// Creates an unmounted widget for the given props.
pub trait WidgetFactory: Send + Sync {
    fn create(&self, props: WidgetProps) -> Result<SubscriptionsWidget, BuildError>;
}

impl<F> WidgetFactory for F
where
    F: Fn(WidgetProps) -> Result<SubscriptionsWidget, BuildError> + Send + Sync,
{
    fn create(&self, props: WidgetProps) -> Result<SubscriptionsWidget, BuildError> {
        self(props)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Widget '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Widget '{0}' is not registered")]
    NotRegistered(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Default)]
pub struct WidgetRegistry {
    factories: HashMap<String, Arc<dyn WidgetFactory>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl WidgetFactory + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn create(&self, name: &str, props: WidgetProps) -> Result<SubscriptionsWidget, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        Ok(factory.create(props)?)
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}
