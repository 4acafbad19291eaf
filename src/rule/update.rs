//! Patch-style update request for rule metadata.
//!
//! Each field carries an explicit patch operation, so "leave unchanged" is
//! distinct from "set to empty". An update with every field `Unchanged` is
//! empty and appliers are expected to skip it.

use std::collections::BTreeSet;

use crate::model::RemediationFunction;
use crate::rule::RuleKey;

/// One field of an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value as it is
    Unchanged,
    /// Remove the stored value
    Clear,
    /// Replace the stored value
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }
}

/// Where an update points a rule's debt characteristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacteristicTarget {
    /// Drop the override and fall back to the definition default
    Default,
    /// Override with the characteristic carrying this key
    Key(String),
}

/// An edit request for one rule
#[derive(Debug, Clone, Default)]
pub struct RuleUpdateFields {
    pub tags: Patch<BTreeSet<String>>,
    pub note: Patch<String>,
    pub characteristic: Patch<CharacteristicTarget>,
    pub function: Patch<RemediationFunction>,
}

#[derive(Debug, Clone)]
pub struct RuleUpdate {
    key: RuleKey,
    fields: RuleUpdateFields,
}

impl RuleUpdate {
    pub fn new(key: RuleKey) -> Self {
        Self {
            key,
            fields: RuleUpdateFields::default(),
        }
    }

    pub fn key(&self) -> &RuleKey {
        &self.key
    }

    /// Replaces the rule's tags; an empty set clears them
    pub fn set_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.fields.tags = if tags.is_empty() {
            Patch::Clear
        } else {
            Patch::Set(tags)
        };
        self
    }

    pub fn clear_tags(mut self) -> Self {
        self.fields.tags = Patch::Clear;
        self
    }

    /// Replaces the rule's note; a blank note clears it
    pub fn set_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.fields.note = if note.trim().is_empty() {
            Patch::Clear
        } else {
            Patch::Set(note)
        };
        self
    }

    pub fn clear_note(mut self) -> Self {
        self.fields.note = Patch::Clear;
        self
    }

    /// Overrides the debt characteristic with the given key
    pub fn set_characteristic(mut self, key: impl Into<String>) -> Self {
        self.fields.characteristic = Patch::Set(CharacteristicTarget::Key(key.into()));
        self
    }

    /// Drops the characteristic override, restoring the definition default
    pub fn reset_characteristic_to_default(mut self) -> Self {
        self.fields.characteristic = Patch::Set(CharacteristicTarget::Default);
        self
    }

    /// Removes debt from the rule entirely
    pub fn remove_characteristic(mut self) -> Self {
        self.fields.characteristic = Patch::Clear;
        self
    }

    pub fn set_function(mut self, function: RemediationFunction) -> Self {
        self.fields.function = Patch::Set(function);
        self
    }

    pub fn clear_function(mut self) -> Self {
        self.fields.function = Patch::Clear;
        self
    }

    pub fn tags(&self) -> &Patch<BTreeSet<String>> {
        &self.fields.tags
    }

    pub fn note(&self) -> &Patch<String> {
        &self.fields.note
    }

    pub fn characteristic(&self) -> &Patch<CharacteristicTarget> {
        &self.fields.characteristic
    }

    pub fn function(&self) -> &Patch<RemediationFunction> {
        &self.fields.function
    }

    /// True when no field is set; appliers skip empty updates
    pub fn is_empty(&self) -> bool {
        self.fields.tags.is_unchanged()
            && self.fields.note.is_unchanged()
            && self.fields.characteristic.is_unchanged()
            && self.fields.function.is_unchanged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RuleKey {
        RuleKey::of("squid", "S001")
    }

    #[test]
    fn test_fresh_update_is_empty() {
        assert!(RuleUpdate::new(key()).is_empty());
    }

    #[test]
    fn test_any_set_field_makes_it_non_empty() {
        assert!(!RuleUpdate::new(key()).clear_note().is_empty());
        assert!(!RuleUpdate::new(key())
            .set_characteristic("MODULARITY")
            .is_empty());
    }

    #[test]
    fn test_empty_tags_collapse_to_clear() {
        let update = RuleUpdate::new(key()).set_tags(BTreeSet::new());
        assert_eq!(*update.tags(), Patch::Clear);

        let update = RuleUpdate::new(key()).set_tags(BTreeSet::from(["perf".to_string()]));
        assert!(matches!(update.tags(), Patch::Set(t) if t.contains("perf")));
    }

    #[test]
    fn test_blank_note_collapses_to_clear() {
        let update = RuleUpdate::new(key()).set_note("   ");
        assert_eq!(*update.note(), Patch::Clear);
    }

    #[test]
    fn test_characteristic_targets_are_distinct() {
        let reset = RuleUpdate::new(key()).reset_characteristic_to_default();
        assert_eq!(
            *reset.characteristic(),
            Patch::Set(CharacteristicTarget::Default)
        );

        let removed = RuleUpdate::new(key()).remove_characteristic();
        assert_eq!(*removed.characteristic(), Patch::Clear);
    }
}
