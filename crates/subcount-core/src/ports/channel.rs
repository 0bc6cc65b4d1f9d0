//! ChannelManager port - ホストの pub/sub チャネル
//!
//! 購読者 ID ごとに「スロット」が 1 つだけあります。
//! subscribe は既存のハンドラを置き換え（積み上げない）、unsubscribe はスロットを空にします。
//!
//! # 設計原則
//! - 同じスロットを total / week で使い回すので、dispatch は必ず直列
//! - ハンドラは結果を受け取るだけの one-shot コールバック

use std::sync::Arc;

use crate::domain::errors::ChannelError;
use crate::domain::ids::SubscriberId;
use crate::domain::query::DispatchPayload;
use crate::domain::result::QueryResult;

/// Callback bound to one dispatch, invoked when its result arrives.
pub type ResultHandler = Arc<dyn Fn(QueryResult) + Send + Sync>;

pub trait ChannelManager: Send + Sync {
    /// Register `on_result` for `subscriber` and send `payload` to the backend.
    fn subscribe_widget(
        &self,
        subscriber: SubscriberId,
        on_result: ResultHandler,
        payload: DispatchPayload,
    ) -> Result<(), ChannelError>;

    /// Drop whatever handler `subscriber` currently holds.
    fn unsubscribe_widget(&self, subscriber: SubscriberId) -> Result<(), ChannelError>;
}
