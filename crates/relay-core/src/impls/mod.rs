//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **StaticMappingProvider**: RuleTable ベースの MappingProvider
//! - **ReqwestExecutor**: 本番用の HttpExecutor（reqwest + tokio）
//! - **RecordingExecutor**: 開発・テスト用の HttpExecutor

pub mod recording;
pub mod reqwest_executor;
pub mod static_provider;

// 主要な型を再エクスポート
pub use self::recording::{ExecutedRequest, RecordingExecutor};
pub use self::reqwest_executor::ReqwestExecutor;
pub use self::static_provider::StaticMappingProvider;
