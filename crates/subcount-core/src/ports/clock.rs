//! Clock port - 時刻の抽象化
//!
//! week クエリの `{{weekStart}}` は「ローカル時刻 - 7 日」から作るので、
//! 時刻は UTC オフセット付きで返します。テストでは FixedClock で時刻とオフセットを固定します。

use chrono::{DateTime, FixedOffset, Local};
use std::sync::Arc;

/// Clock は現在時刻を提供
pub trait Clock: Send + Sync {
    /// Current instant in the host's local offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// 本番用: システム時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// テスト用: 常に同じ時刻を返す
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
}

impl FixedClock {
    /// A UTC instant is taken as a host running at offset zero.
    pub fn new(at: impl Into<DateTime<FixedOffset>>) -> Self {
        Self { at: at.into() }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn fixed_clock_does_not_move() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now().offset().local_minus_utc(), 0);
    }

    #[test]
    fn fixed_clock_keeps_the_given_offset() {
        let kolkata = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let at = kolkata.with_ymd_and_hms(2026, 10, 20, 0, 54, 5).unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now().offset(), &kolkata);
        assert_eq!(clock.now().naive_local().to_string(), "2026-10-20 00:54:05");
    }

    #[test]
    fn system_clock_reports_the_local_offset() {
        let now = SystemClock.now();
        let local = Local::now();
        assert_eq!(now.offset().local_minus_utc(), local.offset().local_minus_utc());
    }
}
