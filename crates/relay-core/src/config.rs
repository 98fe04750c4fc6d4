//! Rule tables - static entity/command → HTTP rule configuration.
//!
//! Tables are plain serde types. The JSON shape is
//!
//! ```json
//! { "Lamp1": { "ON":  { "method": "GET", "url": "http://bulb/on" },
//!              "OFF": { "method": "GET", "url": "http://bulb/off" } } }
//! ```
//!
//! `method` and `url` may be omitted. A rule whose URL is omitted or blank
//! does not map the pair; one with a URL but no method is kept and later
//! skipped at dispatch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use crate::domain::action::is_blank;

/// One configured HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl HttpRule {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("rule table is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("rule table could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule table contains a blank entity name")]
    BlankEntityName,

    #[error("entity '{0}' has a rule with a blank command")]
    BlankCommand(String),
}

/// entity name → command → rule.
///
/// BTreeMap keeps iteration stable, which keeps logs and serialized output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    entities: BTreeMap<String, BTreeMap<String, HttpRule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleTableError> {
        let table: RuleTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleTableError> {
        let table: RuleTable = serde_json::from_reader(reader)?;
        table.validate()?;
        Ok(table)
    }

    /// Add or replace a rule, returning the replaced one.
    pub fn insert(
        &mut self,
        entity_name: impl Into<String>,
        command: impl Into<String>,
        rule: HttpRule,
    ) -> Option<HttpRule> {
        self.entities
            .entry(entity_name.into())
            .or_default()
            .insert(command.into(), rule)
    }

    /// Builder-style [`RuleTable::insert`].
    pub fn with_rule(
        mut self,
        entity_name: impl Into<String>,
        command: impl Into<String>,
        rule: HttpRule,
    ) -> Self {
        self.insert(entity_name, command, rule);
        self
    }

    pub fn get(&self, entity_name: &str, command: &str) -> Option<&HttpRule> {
        self.entities.get(entity_name)?.get(command)
    }

    pub fn contains_entity(&self, entity_name: &str) -> bool {
        self.entities.contains_key(entity_name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Rules configured for one entity, ordered by command.
    pub fn rules(&self, entity_name: &str) -> impl Iterator<Item = (&str, &HttpRule)> {
        self.entities
            .get(entity_name)
            .into_iter()
            .flat_map(|rules| rules.iter().map(|(cmd, rule)| (cmd.as_str(), rule)))
    }

    pub fn len(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), RuleTableError> {
        for (entity, rules) in &self.entities {
            if is_blank(entity) {
                return Err(RuleTableError::BlankEntityName);
            }
            if rules.keys().any(|cmd| is_blank(cmd)) {
                return Err(RuleTableError::BlankCommand(entity.clone()));
            }
        }
        Ok(())
    }
}
