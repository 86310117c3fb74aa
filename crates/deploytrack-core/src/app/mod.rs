//! App - アプリケーション層
//!
//! ports と domain を組み合わせて、snapshot に対する操作を提供します。
//!
//! # 主要コンポーネント
//! - **StoreBuilder**: store の構築とワイヤリング
//! - **DeploymentStateStore**: snapshot を所有し、変更の入口を一本化する
//! - **promotion**: quick-deploy（`promote`）

pub mod builder;
pub mod promotion;
pub mod store;

pub use self::builder::StoreBuilder;
pub use self::promotion::{promoted_slot, PromotionOutcome};
pub use self::store::DeploymentStateStore;
