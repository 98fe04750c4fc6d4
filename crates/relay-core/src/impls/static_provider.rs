//! StaticMappingProvider - RuleTable をそのまま MappingProvider として公開
//!
//! Tables are loaded by whoever owns the configuration and handed over whole.
//! A provider never changes after construction; to change rules, register a
//! new provider and remove the old one.

use crate::config::{RuleTable, RuleTableError};
use crate::ports::MappingProvider;

#[derive(Debug, Clone, Default)]
pub struct StaticMappingProvider {
    table: RuleTable,
}

impl StaticMappingProvider {
    pub fn from_table(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleTableError> {
        Ok(Self::from_table(RuleTable::from_json_str(json)?))
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl MappingProvider for StaticMappingProvider {
    fn provides_binding_for(&self, entity_name: &str) -> bool {
        self.table.contains_entity(entity_name)
    }

    fn http_method(&self, entity_name: &str, command: &str) -> Option<String> {
        self.table.get(entity_name, command)?.method.clone()
    }

    fn url(&self, entity_name: &str, command: &str) -> Option<String> {
        self.table.get(entity_name, command)?.url.clone()
    }
}
