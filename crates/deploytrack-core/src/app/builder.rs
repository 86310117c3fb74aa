//! StoreBuilder - store の構築とワイヤリング
//!
//! backend は必須、それ以外（clock / token generator / config）は
//! 省略すると本番用のデフォルトになります。

use crate::app::store::DeploymentStateStore;
use crate::config::TrackerConfig;
use crate::domain::Snapshot;
use crate::ports::{Clock, DeploymentBackend, SystemClock, TokenGenerator, UlidTokenGenerator};

/// StoreBuilder は `DeploymentStateStore` を構築
///
/// # 使用例
/// ```ignore
/// let mut store = StoreBuilder::new(InMemoryBackend::new())
///     .clock(FixedClock::new(now))
///     .config(TrackerConfig::from_env())
///     .build();
/// store.refresh().await?;
/// ```
pub struct StoreBuilder<B> {
    backend: B,
    clock: Box<dyn Clock>,
    tokens: Option<Box<dyn TokenGenerator>>,
    config: TrackerConfig,
}

impl<B: DeploymentBackend> StoreBuilder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: Box::new(SystemClock),
            tokens: None,
            config: TrackerConfig::default(),
        }
    }

    /// Also seeds the default token generator, so pending ids follow the same clock.
    pub fn clock<C: Clock + Clone + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock.clone());
        if self.tokens.is_none() {
            self.tokens = Some(Box::new(UlidTokenGenerator::new(clock)));
        }
        self
    }

    pub fn tokens(mut self, tokens: impl TokenGenerator + 'static) -> Self {
        self.tokens = Some(Box::new(tokens));
        self
    }

    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts with an empty snapshot; call `refresh()` for the initial load.
    pub fn build(self) -> DeploymentStateStore<B> {
        let tokens = self
            .tokens
            .unwrap_or_else(|| Box::new(UlidTokenGenerator::new(SystemClock)));
        DeploymentStateStore {
            backend: self.backend,
            clock: self.clock,
            tokens,
            config: self.config,
            snapshot: Snapshot::default(),
        }
    }
}
