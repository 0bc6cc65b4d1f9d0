//! subcount-core
//!
//! API サブスクリプション件数ウィジェット（全期間 / 直近 7 日）のコア。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, count, query, result, locale, state, errors）
//! - **ports**: ホストの能力の抽象化（WidgetConfigProvider, ChannelManager, LocaleSource, Clock など）
//! - **app**: アプリケーションロジック（builder, pipeline, widget, render, registry）
//! - **impls**: 実装（InMemoryChannelManager, HttpLocaleSource など）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
