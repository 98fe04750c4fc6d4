//! App - アプリケーション層
//!
//! ports を組み合わせて dispatch のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ProviderRegistry**: MappingProvider の集合（挿入順・set semantics）
//! - **Dispatcher**: command event → provider 解決 → HttpExecutor
//! - **DispatcherBuilder**: 構築とワイヤリング（起動時検証）

pub mod builder;
pub mod dispatcher;
pub mod registry;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatcher::{Dispatcher, SOCKET_TIMEOUT};
pub use self::registry::ProviderRegistry;
