//! ProviderRegistry - MappingProvider の登録と管理
//!
//! # 学習ポイント
//! - `Arc<dyn Trait>` のポインタ同一性による set semantics
//! - RwLock + snapshot（copy-on-iterate）で iteration と add/remove を競合させない
//! - 挿入順を保持して first-match を決定的にする

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ports::MappingProvider;

/// Set of providers, iterated in insertion order.
///
/// Membership is by identity: two `Arc`s are the same provider when they
/// point at the same allocation. Adding a provider twice keeps its original
/// position.
///
/// # 使用例
/// ```ignore
/// let registry = ProviderRegistry::new();
/// let provider: Arc<dyn MappingProvider> = Arc::new(StaticMappingProvider::from_table(table));
/// registry.add(provider.clone());
///
/// for p in registry.snapshot() { /* lock is not held here */ }
/// registry.remove(&provider);
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<dyn MappingProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Returns false if it was already registered.
    pub fn add(&self, provider: Arc<dyn MappingProvider>) -> bool {
        let mut providers = self.write();
        if providers.iter().any(|p| same_provider(p, &provider)) {
            return false;
        }
        providers.push(provider);
        true
    }

    /// Unregister a provider. Returns false if it was not registered.
    pub fn remove(&self, provider: &Arc<dyn MappingProvider>) -> bool {
        let mut providers = self.write();
        let before = providers.len();
        providers.retain(|p| !same_provider(p, provider));
        providers.len() != before
    }

    pub fn contains(&self, provider: &Arc<dyn MappingProvider>) -> bool {
        self.read().iter().any(|p| same_provider(p, provider))
    }

    /// Copy of the current membership, in insertion order.
    ///
    /// The lock is released before this returns, so callers may query
    /// providers while other threads add or remove.
    pub fn snapshot(&self) -> Vec<Arc<dyn MappingProvider>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The guarded Vec is always in a valid state, so a poisoned lock is safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn MappingProvider>>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<dyn MappingProvider>>> {
        self.providers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.len())
            .finish()
    }
}

fn same_provider(a: &Arc<dyn MappingProvider>, b: &Arc<dyn MappingProvider>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
