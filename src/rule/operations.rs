//! Debt mutations on rule rows.
//!
//! Shared by the XML restore (overrides parsed from the backup document) and
//! by interactive rule updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{DebtModelError, ModelResult};
use crate::model::RemediationFunction;
use crate::rule::update::{CharacteristicTarget, Patch, RuleUpdate};
use crate::store::{CharacteristicRow, RuleRow, DISABLED_CHARACTERISTIC_ID};

/// Applies a resolved debt override to `rule`.
///
/// An override identical to the rule's stored defaults is collapsed to "no
/// override", so restoring a document produced by an export of untouched
/// rules leaves them untouched.
pub fn set_debt_override(
    rule: &mut RuleRow,
    characteristic: &CharacteristicRow,
    function: &RemediationFunction,
) {
    let matches_defaults = rule.default_characteristic_id == Some(characteristic.id)
        && rule.default_function == Some(function.kind)
        && rule.default_coefficient == function.coefficient
        && rule.default_offset == function.offset;

    if matches_defaults {
        rule.clear_override();
    } else {
        rule.characteristic_id = Some(characteristic.id);
        rule.function = Some(function.kind);
        rule.coefficient = function.coefficient.clone();
        rule.offset = function.offset.clone();
    }
}

/// Applies an update request to `rule`.
///
/// `characteristics` is the enabled characteristic set used to resolve a key
/// target; an unknown key fails with `CharacteristicNotFound`. Empty updates
/// leave the row untouched, including its update timestamp.
pub fn apply_update(
    rule: &mut RuleRow,
    update: &RuleUpdate,
    characteristics: &[CharacteristicRow],
    now: DateTime<Utc>,
) -> ModelResult<()> {
    if update.is_empty() {
        return Ok(());
    }

    match update.tags() {
        Patch::Unchanged => {}
        Patch::Clear => rule.tags.clear(),
        Patch::Set(tags) => rule.tags = tags.clone(),
    }

    match update.note() {
        Patch::Unchanged => {}
        Patch::Clear => rule.note = None,
        Patch::Set(note) => rule.note = Some(note.clone()),
    }

    match update.characteristic() {
        Patch::Unchanged => {}
        Patch::Clear => {
            // Debt removed outright: sentinel id, no function
            rule.characteristic_id = Some(DISABLED_CHARACTERISTIC_ID);
            rule.function = None;
            rule.coefficient = None;
            rule.offset = None;
        }
        Patch::Set(CharacteristicTarget::Default) => {
            rule.clear_override();
        }
        Patch::Set(CharacteristicTarget::Key(key)) => {
            let by_key: HashMap<&str, &CharacteristicRow> = characteristics
                .iter()
                .map(|c| (c.key.as_str(), c))
                .collect();
            let row = by_key
                .get(key.as_str())
                .ok_or_else(|| DebtModelError::CharacteristicNotFound(key.clone()))?;
            rule.characteristic_id = Some(row.id);
        }
    }

    match update.function() {
        Patch::Unchanged => {}
        Patch::Clear => {
            rule.function = None;
            rule.coefficient = None;
            rule.offset = None;
        }
        Patch::Set(function) => {
            rule.function = Some(function.kind);
            rule.coefficient = function.coefficient.clone();
            rule.offset = function.offset.clone();
        }
    }

    rule.updated_at = Some(now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionKind;
    use crate::rule::RuleKey;
    use std::collections::BTreeSet;

    fn characteristic(id: i64, key: &str) -> CharacteristicRow {
        CharacteristicRow::new(key, key).with_id(id)
    }

    fn rule_with_defaults() -> RuleRow {
        let mut rule = RuleRow::new("squid", "S001").with_id(1);
        rule.default_characteristic_id = Some(3);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());
        rule
    }

    #[test]
    fn test_override_equal_to_defaults_collapses() {
        let mut rule = rule_with_defaults();
        set_debt_override(
            &mut rule,
            &characteristic(3, "MODULARITY"),
            &RemediationFunction::linear("30min"),
        );
        assert!(!rule.has_override());
    }

    #[test]
    fn test_differing_override_is_stored() {
        let mut rule = rule_with_defaults();
        set_debt_override(
            &mut rule,
            &characteristic(3, "MODULARITY"),
            &RemediationFunction::linear("2h"),
        );
        assert_eq!(rule.characteristic_id, Some(3));
        assert_eq!(rule.function, Some(FunctionKind::Linear));
        assert_eq!(rule.coefficient.as_deref(), Some("2h"));
        assert_eq!(rule.offset, None);
    }

    #[test]
    fn test_update_applies_tags_and_note() {
        let mut rule = rule_with_defaults();
        let update = RuleUpdate::new(RuleKey::of("squid", "S001"))
            .set_tags(BTreeSet::from(["perf".to_string(), "debt".to_string()]))
            .set_note("reviewed");
        apply_update(&mut rule, &update, &[], Utc::now()).unwrap();
        assert_eq!(rule.tags.len(), 2);
        assert_eq!(rule.note.as_deref(), Some("reviewed"));
        assert!(rule.updated_at.is_some());
    }

    #[test]
    fn test_update_removing_characteristic_writes_sentinel() {
        let mut rule = rule_with_defaults();
        rule.function = Some(FunctionKind::ConstantIssue);
        rule.offset = Some("5min".into());

        let update = RuleUpdate::new(RuleKey::of("squid", "S001")).remove_characteristic();
        apply_update(&mut rule, &update, &[], Utc::now()).unwrap();

        assert_eq!(rule.characteristic_id, Some(DISABLED_CHARACTERISTIC_ID));
        assert_eq!(rule.function, None);
        assert_eq!(rule.effective_characteristic_id(), None);
    }

    #[test]
    fn test_update_reset_to_default_clears_override() {
        let mut rule = rule_with_defaults();
        rule.characteristic_id = Some(7);
        rule.function = Some(FunctionKind::ConstantIssue);
        rule.offset = Some("5min".into());

        let update = RuleUpdate::new(RuleKey::of("squid", "S001")).reset_characteristic_to_default();
        apply_update(&mut rule, &update, &[], Utc::now()).unwrap();

        assert!(!rule.has_override());
        assert_eq!(rule.effective_characteristic_id(), Some(3));
    }

    #[test]
    fn test_update_with_unknown_characteristic_fails() {
        let mut rule = rule_with_defaults();
        let update = RuleUpdate::new(RuleKey::of("squid", "S001")).set_characteristic("NOPE");
        let err = apply_update(
            &mut rule,
            &update,
            &[characteristic(3, "MODULARITY")],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DebtModelError::CharacteristicNotFound(k) if k == "NOPE"));
    }

    #[test]
    fn test_empty_update_leaves_timestamp_alone() {
        let mut rule = rule_with_defaults();
        let update = RuleUpdate::new(RuleKey::of("squid", "S001"));
        apply_update(&mut rule, &update, &[], Utc::now()).unwrap();
        assert_eq!(rule.updated_at, None);
    }
}
