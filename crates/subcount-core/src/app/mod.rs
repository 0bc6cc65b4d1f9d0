//! App - アプリケーション層
//!
//! ports を組み合わせてウィジェットのロジックを実装します。
//!
//! # 主要コンポーネント
//! - **WidgetBuilder**: ウィジェットの構築とワイヤリング
//! - **SubscriptionPipeline**: total → week の状態機械（純粋）
//! - **SubscriptionsWidget / MountedWidget**: ライフサイクルとイベントループ
//! - **render**: 表示状態 → ビューモデル
//! - **WidgetRegistry**: ウィジェット名 → ファクトリ

pub mod builder;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod widget;

pub use self::builder::{BuildError, WidgetBuilder};
pub use self::pipeline::{Effect, SubscriptionPipeline};
pub use self::registry::{RegistryError, WidgetFactory, WidgetRegistry};
pub use self::render::{RenderOutput, SubscriptionsProps, render};
pub use self::widget::{
    DEFAULT_THEME, MountedWidget, SubscriptionsWidget, WIDGET_NAME, WidgetPorts, WidgetProps,
};
