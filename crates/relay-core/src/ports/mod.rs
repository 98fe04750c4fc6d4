//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! relay が消費する外部コラボレーターは 2 つだけです：
//! - **MappingProvider**: 設定ルールのビュー（entity/command → method + URL）
//! - **HttpExecutor**: 実際のネットワーク呼び出し

pub mod http_executor;
pub mod mapping_provider;

// 主要な trait を再エクスポート
pub use self::http_executor::{ExecuteError, HttpExecutor};
pub use self::mapping_provider::MappingProvider;
