//! InMemoryChannelManager - 開発用・テスト用のチャネル
//!
//! # 学習ポイント
//! - Mutex<HashMap> による購読スロット管理（subscribe は置き換え）
//! - ハンドラはロックを外してから呼ぶ（ハンドラ内での再入を防ぐ）
//! - Responder で「バックエンドが即座に答える」状況を再現

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::domain::errors::ChannelError;
use crate::domain::ids::SubscriberId;
use crate::domain::query::DispatchPayload;
use crate::domain::result::QueryResult;
use crate::ports::{ChannelManager, ResultHandler};

/// Simulated backend: given a payload, optionally answer it right away.
pub type Responder = Arc<dyn Fn(&DispatchPayload) -> Option<QueryResult> + Send + Sync>;

struct Slot {
    handler: ResultHandler,
    payload: DispatchPayload,
}

#[derive(Default)]
struct ChannelLog {
    dispatched: Vec<(SubscriberId, DispatchPayload)>,
    unsubscribed: Vec<SubscriberId>,
}

/// InMemoryChannelManager は購読者 ID ごとに 1 スロットを持つチャネル
///
/// # 使用例
/// ```ignore
/// let channel = InMemoryChannelManager::new();
/// channel.subscribe_widget(id, handler, payload)?;
/// channel.deliver(id, QueryResult::single(5))?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryChannelManager {
    slots: Arc<Mutex<HashMap<SubscriberId, Slot>>>,
    log: Arc<Mutex<ChannelLog>>,
    responder: Option<Responder>,
}

impl InMemoryChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every dispatch with `responder` as soon as it is subscribed.
    pub fn with_responder(responder: Responder) -> Self {
        Self {
            responder: Some(responder),
            ..Self::default()
        }
    }

    /// Deliver `result` to the handler currently held by `subscriber`.
    ///
    /// Returns `false` when the slot is empty (nothing listens any more).
    pub fn deliver(&self, subscriber: SubscriberId, result: QueryResult) -> Result<bool, ChannelError> {
        let handler = {
            let slots = self.slots.lock().map_err(|_| ChannelError::Poisoned)?;
            slots.get(&subscriber).map(|slot| slot.handler.clone())
        };
        match handler {
            Some(handler) => {
                handler(result);
                Ok(true)
            }
            None => {
                debug!(%subscriber, "result dropped, no active subscription");
                Ok(false)
            }
        }
    }

    /// The payload the slot of `subscriber` was last subscribed with.
    pub fn active_payload(&self, subscriber: SubscriberId) -> Option<DispatchPayload> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&subscriber)
            .map(|slot| slot.payload.clone())
    }

    pub fn is_subscribed(&self, subscriber: SubscriberId) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&subscriber)
    }

    /// Every payload dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<DispatchPayload> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatched
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Number of unsubscribe calls made for `subscriber`.
    pub fn unsubscribe_count(&self, subscriber: SubscriberId) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsubscribed
            .iter()
            .filter(|id| **id == subscriber)
            .count()
    }
}

impl ChannelManager for InMemoryChannelManager {
    fn subscribe_widget(
        &self,
        subscriber: SubscriberId,
        on_result: ResultHandler,
        payload: DispatchPayload,
    ) -> Result<(), ChannelError> {
        {
            let mut slots = self.slots.lock().map_err(|_| ChannelError::Poisoned)?;
            let replaced = slots
                .insert(
                    subscriber,
                    Slot {
                        handler: on_result.clone(),
                        payload: payload.clone(),
                    },
                )
                .is_some();
            if replaced {
                debug!(%subscriber, "subscription replaced");
            }
        }
        self.log
            .lock()
            .map_err(|_| ChannelError::Poisoned)?
            .dispatched
            .push((subscriber, payload.clone()));

        if let Some(responder) = &self.responder
            && let Some(result) = responder(&payload)
        {
            on_result(result);
        }
        Ok(())
    }

    fn unsubscribe_widget(&self, subscriber: SubscriberId) -> Result<(), ChannelError> {
        self.slots
            .lock()
            .map_err(|_| ChannelError::Poisoned)?
            .remove(&subscriber);
        self.log
            .lock()
            .map_err(|_| ChannelError::Poisoned)?
            .unsubscribed
            .push(subscriber);
        Ok(())
    }
}
