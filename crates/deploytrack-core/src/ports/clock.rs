//! Clock port - 時刻の抽象化
//!
//! promote / set_version が押す `last_deploy` は日付だけですが、
//! テストで固定できるように trait 経由で取得します。

use chrono::{DateTime, NaiveDate, Utc};

/// Clock は現在時刻を提供
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for `last_deploy` stamps.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// SystemClock は本番用
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// FixedClock はテスト用（常に同じ時刻を返す）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
