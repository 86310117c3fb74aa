//! Ports - 抽象化レイヤー
//!
//! core の外側にあるもの（永続化 / API、時刻、一時 ID の生成）への
//! インターフェースです。実装は `impls` または利用側のクレートに置きます。

pub mod backend;
pub mod clock;
pub mod id_generator;

pub use self::backend::DeploymentBackend;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{TokenGenerator, UlidTokenGenerator};
