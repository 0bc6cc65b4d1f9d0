//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryChannelManager**: 開発用・テスト用の pub/sub チャネル
//! - **StaticConfigProvider / FileConfigProvider**: 設定ストア
//! - **HttpLocaleSource / DirLocaleSource / StaticLocaleSource**: ロケールバンドル
//! - **SystemLocaleDetector / FixedLocaleDetector**: 言語検出

pub mod config_store;
pub mod inmem_channel;
pub mod locale_sources;

pub use self::config_store::{FileConfigProvider, StaticConfigProvider};
pub use self::inmem_channel::{InMemoryChannelManager, Responder};
pub use self::locale_sources::{
    DirLocaleSource, FixedLocaleDetector, HttpLocaleSource, StaticLocaleSource,
    SystemLocaleDetector,
};
