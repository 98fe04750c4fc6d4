//! ResolvedAction - the HTTP call a dispatch decided to make.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Method and URL taken from a single winning provider.
///
/// Only constructed through [`ResolvedAction::from_parts`], so both fields are
/// always non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    method: String,
    url: String,
}

impl ResolvedAction {
    /// Combine a provider's method and URL into an action.
    ///
    /// Returns `None` when either part is absent, empty or whitespace-only.
    pub fn from_parts(method: Option<String>, url: Option<String>) -> Option<Self> {
        let method = method.filter(|m| !is_blank(m))?;
        let url = url.filter(|u| !is_blank(u))?;
        Some(Self { method, url })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
