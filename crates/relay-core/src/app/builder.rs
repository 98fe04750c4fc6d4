//! DispatcherBuilder - Dispatcher の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 外から注入された registry の共有（singleton にしない）

use std::sync::Arc;

use crate::app::dispatcher::Dispatcher;
use crate::app::registry::ProviderRegistry;
use crate::ports::{HttpExecutor, MappingProvider};

/// DispatcherBuilder は Dispatcher を構築
///
/// # 使用例
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .provider(Arc::new(StaticMappingProvider::from_table(table)))
///     .executor(Arc::new(ReqwestExecutor::new(handle)))
///     .expect_entities(&["Lamp1"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - executor が無ければ BuildError::MissingExecutor
/// - expect_entities() の entity を claim する provider が無ければ
///   BuildError::UnboundEntities
#[derive(Default)]
pub struct DispatcherBuilder {
    registry: Option<Arc<ProviderRegistry>>,
    providers: Vec<Arc<dyn MappingProvider>>,
    executor: Option<Arc<dyn HttpExecutor>>,
    expected_entities: Option<Vec<String>>,
}

/// BuildError は Dispatcher 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No HttpExecutor configured.")]
    MissingExecutor,

    #[error("Unbound entities: {0:?}. These entities were expected but no provider claims them.")]
    UnboundEntities(Vec<String>),
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing registry, e.g. one the lifecycle system also mutates.
    pub fn registry(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Provider を登録（build() 時に registry へ追加）
    pub fn provider(mut self, provider: Arc<dyn MappingProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// 期待される entity のリストを設定
    pub fn expect_entities(mut self, entity_names: &[&str]) -> Self {
        self.expected_entities = Some(entity_names.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let executor = self.executor.ok_or(BuildError::MissingExecutor)?;
        let registry = self.registry.unwrap_or_default();
        for provider in self.providers {
            registry.add(provider);
        }

        if let Some(expected) = &self.expected_entities {
            let providers = registry.snapshot();
            let unbound: Vec<String> = expected
                .iter()
                .filter(|entity| !providers.iter().any(|p| p.provides_binding_for(entity)))
                .cloned()
                .collect();
            if !unbound.is_empty() {
                return Err(BuildError::UnboundEntities(unbound));
            }
        }

        Ok(Dispatcher::new(registry, executor))
    }
}
