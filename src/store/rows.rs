//! Row types exchanged with the storage collaborator.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::FunctionKind;
use crate::rule::RuleKey;

/// Override characteristic id meaning "debt explicitly removed from this
/// rule", as opposed to `None` which means "no override, use the default".
pub const DISABLED_CHARACTERISTIC_ID: i64 = -1;

/// Stored debt characteristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicRow {
    /// Assigned by the store on insert
    pub id: i64,
    pub key: String,
    pub name: String,
    /// Display order, roots only
    pub order: Option<i32>,
    pub parent_id: Option<i64>,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CharacteristicRow {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            key: key.into(),
            name: name.into(),
            order: None,
            parent_id: None,
            enabled: true,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_parent_id(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Stored rule with its debt columns.
///
/// Debt is stored twice: the `default_*` quad comes from the rule definition
/// and is rewritten on reset, the override quad is set by users or by an XML
/// restore and wins over the default when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRow {
    pub id: i64,
    pub repository_key: String,
    pub rule_key: String,
    pub language: Option<String>,
    pub tags: BTreeSet<String>,
    pub note: Option<String>,

    pub default_characteristic_id: Option<i64>,
    pub default_function: Option<FunctionKind>,
    pub default_coefficient: Option<String>,
    pub default_offset: Option<String>,

    pub characteristic_id: Option<i64>,
    pub function: Option<FunctionKind>,
    pub coefficient: Option<String>,
    pub offset: Option<String>,

    pub enabled: bool,
    /// Manually created rules have no definition and are skipped by resets
    pub manual: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RuleRow {
    pub fn new(repository_key: impl Into<String>, rule_key: impl Into<String>) -> Self {
        Self {
            id: 0,
            repository_key: repository_key.into(),
            rule_key: rule_key.into(),
            language: None,
            tags: BTreeSet::new(),
            note: None,
            default_characteristic_id: None,
            default_function: None,
            default_coefficient: None,
            default_offset: None,
            characteristic_id: None,
            function: None,
            coefficient: None,
            offset: None,
            enabled: true,
            manual: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn key(&self) -> RuleKey {
        RuleKey::of(&self.repository_key, &self.rule_key)
    }

    /// The characteristic the rule's debt resolves to: override wins over
    /// default, the disabled sentinel resolves to none.
    pub fn effective_characteristic_id(&self) -> Option<i64> {
        let id = self.characteristic_id.or(self.default_characteristic_id)?;
        if id == DISABLED_CHARACTERISTIC_ID {
            None
        } else {
            Some(id)
        }
    }

    pub fn has_override(&self) -> bool {
        self.characteristic_id.is_some() || self.function.is_some()
    }

    /// Drops the override quad, falling back to the defaults
    pub fn clear_override(&mut self) {
        self.characteristic_id = None;
        self.function = None;
        self.coefficient = None;
        self.offset = None;
    }

    /// Drops the default quad
    pub fn clear_defaults(&mut self) {
        self.default_characteristic_id = None;
        self.default_function = None;
        self.default_coefficient = None;
        self.default_offset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_default() {
        let mut rule = RuleRow::new("squid", "S001");
        rule.default_characteristic_id = Some(3);
        assert_eq!(rule.effective_characteristic_id(), Some(3));

        rule.characteristic_id = Some(7);
        assert_eq!(rule.effective_characteristic_id(), Some(7));
    }

    #[test]
    fn test_disabled_sentinel_resolves_to_none() {
        let mut rule = RuleRow::new("squid", "S001");
        rule.default_characteristic_id = Some(3);
        rule.characteristic_id = Some(DISABLED_CHARACTERISTIC_ID);
        assert_eq!(rule.effective_characteristic_id(), None);
    }

    #[test]
    fn test_clear_override_keeps_defaults() {
        let mut rule = RuleRow::new("squid", "S001");
        rule.default_characteristic_id = Some(3);
        rule.default_function = Some(FunctionKind::Linear);
        rule.characteristic_id = Some(7);
        rule.function = Some(FunctionKind::ConstantIssue);
        rule.offset = Some("5min".into());

        rule.clear_override();
        assert!(!rule.has_override());
        assert_eq!(rule.effective_characteristic_id(), Some(3));
        assert_eq!(rule.default_function, Some(FunctionKind::Linear));
    }
}
