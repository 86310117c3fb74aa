//! deploytrack-core
//!
//! Deployment-state and aggregation model for a portfolio of projects.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, environment, project, checklist, snapshot, metrics, record, errors）
//! - **ports**: 抽象化レイヤー（DeploymentBackend, Clock, TokenGenerator）
//! - **app**: アプリケーションロジック（StoreBuilder, DeploymentStateStore, promotion）
//! - **impls**: 実装（InMemoryBackend）
//! - **config**: TrackerConfig

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{DeploymentStateStore, PromotionOutcome, StoreBuilder};
pub use config::{PromotionPolicy, TrackerConfig};
pub use domain::TrackerError;
