//! Impls - ports の実装（開発用・テスト用）
//!
//! 本番用の collaborator（HTTP クライアントなど）は利用側のクレートに置きます。

pub mod inmem_backend;

pub use self::inmem_backend::InMemoryBackend;
