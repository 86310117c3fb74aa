//! TokenGenerator port - 未永続化 checklist item の一時 ID
//!
//! collaborator が ID を採番するまでの間だけ使う識別子です。
//! ULID なので生成順に並び、数値 ID とは型レベルで混ざりません。

use crate::domain::ids::LocalToken;
use crate::ports::Clock;
use ulid::Ulid;

pub trait TokenGenerator: Send + Sync {
    fn next_token(&self) -> LocalToken;
}

/// UlidTokenGenerator は Clock の時刻 + 乱数で ULID を作る
pub struct UlidTokenGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidTokenGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> TokenGenerator for UlidTokenGenerator<C> {
    fn next_token(&self) -> LocalToken {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        LocalToken::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
