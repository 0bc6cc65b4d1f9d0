//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock から timestamp を取る）

use crate::domain::ids::{DispatchId, SubscriberId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は購読者 ID と dispatch ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（ウィジェットのイベントループから使う）
pub trait IdGenerator: Send + Sync {
    fn generate_subscriber_id(&self) -> SubscriberId;

    fn generate_dispatch_id(&self) -> DispatchId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡すと timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_subscriber_id(&self) -> SubscriberId {
        SubscriberId::from(self.next_ulid())
    }

    fn generate_dispatch_id(&self) -> DispatchId {
        DispatchId::from(self.next_ulid())
    }
}
