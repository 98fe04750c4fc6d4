//! relay-core
//!
//! Relays command events addressed to named entities to outbound HTTP calls.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Command, CommandEvent, ResolvedAction, DispatchOutcome）
//! - **ports**: 抽象化レイヤー（MappingProvider, HttpExecutor）
//! - **app**: ProviderRegistry, Dispatcher, DispatcherBuilder
//! - **impls**: 実装（StaticMappingProvider, ReqwestExecutor, RecordingExecutor）
//! - **config**: RuleTable（静的ルールテーブル）
//! - **observability**: dispatch 結果のカウンタ

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{BuildError, Dispatcher, DispatcherBuilder, ProviderRegistry, SOCKET_TIMEOUT};
pub use domain::{Command, CommandEvent, DispatchOutcome, OutcomeKind, ResolvedAction};
pub use ports::{ExecuteError, HttpExecutor, MappingProvider};
