//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。ウィジェットが使うホストの能力
//! （設定ストア、pub/sub チャネル、ロケール、時刻、ID 生成）をすべて trait にして
//! 継承ではなく注入で渡します。

pub mod channel;
pub mod clock;
pub mod config_provider;
pub mod id_generator;
pub mod locale;

pub use self::channel::{ChannelManager, ResultHandler};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::config_provider::{WidgetConfigProvider, WidgetConfigs, WidgetConfiguration};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::locale::{LocaleDetector, LocaleSource};
