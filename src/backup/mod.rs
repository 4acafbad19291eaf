//! # Debt model backup, restore and reset
//!
//! One service reconciles the stored debt model against a target model,
//! which comes either from the bundled plugin default or from a
//! user-supplied XML document, and serializes the stored model back to XML.
//!
//! ## Invariants
//! - Roots are reconciled before their children; a child's parent id is the
//!   just-resolved parent's id
//! - Characteristics absent from the target are disabled, never deleted
//! - A restore either commits the whole reconciliation or nothing
//! - Every entry point checks the caller's permission before reading data

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::auth::{GlobalPermission, UserSession};
use crate::definitions::{RuleDefinition, RuleDefinitionsLoader};
use crate::error::{DebtModelError, ModelResult};
use crate::index::RuleIndex;
use crate::model::{Characteristic, DebtModel, RemediationFunction, RuleDebt};
use crate::plugin::{PluginModelRepository, DEFAULT_MODEL_PLUGIN};
use crate::rule::{set_debt_override, RuleKey};
use crate::store::{CharacteristicRow, ModelStore, RuleRow, StoreSession};
use crate::validation::ValidationMessages;
use crate::xml;

/// Backup/restore entry points over the debt model.
///
/// Holds the storage, plugin, rule-definition and search-index
/// collaborators; each operation opens one store session and commits at
/// most once.
pub struct ModelBackup<S, P, L, I> {
    store: S,
    plugins: P,
    definitions: L,
    index: I,
}

impl<S, P, L, I> ModelBackup<S, P, L, I>
where
    S: ModelStore,
    P: PluginModelRepository,
    L: RuleDefinitionsLoader,
    I: RuleIndex,
{
    pub fn new(store: S, plugins: P, definitions: L, index: I) -> Self {
        Self {
            store,
            plugins,
            definitions,
            index,
        }
    }

    /// Serializes the stored model to XML
    pub fn backup(&self, caller: &UserSession) -> ModelResult<String> {
        self.backup_model(caller, None)
    }

    /// Serializes the stored model to XML, keeping only rules of `language`
    pub fn backup_for_language(&self, caller: &UserSession, language: &str) -> ModelResult<String> {
        self.backup_model(caller, Some(language))
    }

    fn backup_model(&self, caller: &UserSession, language: Option<&str>) -> ModelResult<String> {
        caller.check_global_permission(GlobalPermission::SystemAdmin)?;

        let session = self.store.open_session()?;
        let model = build_model(&session.select_enabled_characteristics()?);

        let mut rules: Vec<RuleDebt> = Vec::new();
        for rule in session.select_enabled_non_manual_rules()? {
            if matches_language(&rule, language) {
                if let Some(debt) = resolved_rule_debt(&rule, &model) {
                    rules.push(debt);
                }
            }
        }
        xml::export_model(&model, &rules)
        // read-only: the session is released without commit
    }

    /// Replaces the stored model with the bundled plugin default and resets
    /// every rule's debt to its definition, dropping all overrides
    pub fn reset_to_defaults(&self, caller: &UserSession) -> ModelResult<()> {
        caller.check_global_permission(GlobalPermission::SystemAdmin)?;

        let now = Utc::now();
        let target = self.load_default_model()?;
        let mut session = self.store.open_session()?;

        let characteristics = restore_characteristics(session.as_mut(), &target, now)?;
        let mut rules = session.select_enabled_non_manual_rules()?;

        if !rules.is_empty() {
            let by_key = index_characteristics(&characteristics);
            let definitions: HashMap<RuleKey, RuleDefinition> = self
                .definitions
                .load()
                .into_iter()
                .map(|d| (d.key.clone(), d))
                .collect();

            for rule in &mut rules {
                // Custom rules have no definition and keep their defaults
                if let Some(definition) = definitions.get(&rule.key()) {
                    apply_definition_defaults(rule, definition, &by_key);
                }
                rule.clear_override();
                rule.updated_at = Some(now);
                session.update_rule(rule)?;
            }
            self.index.reindex(&rules);
        }

        session.commit()?;
        info!(rules = rules.len(), "debt model reset to plugin defaults");
        Ok(())
    }

    /// Restores characteristics and rule debt from an XML document.
    ///
    /// Recoverable input problems land in the returned messages and nothing
    /// is committed; an unknown characteristic key or a storage failure
    /// aborts with an error instead.
    pub fn restore_from_xml(
        &self,
        caller: &UserSession,
        xml: &str,
    ) -> ModelResult<ValidationMessages> {
        self.restore_xml_model(caller, xml, None)
    }

    /// Same as [`restore_from_xml`](Self::restore_from_xml), but only rules
    /// of `language` have their debt restored from the document
    pub fn restore_from_xml_for_language(
        &self,
        caller: &UserSession,
        xml: &str,
        language: &str,
    ) -> ModelResult<ValidationMessages> {
        self.restore_xml_model(caller, xml, Some(language))
    }

    fn restore_xml_model(
        &self,
        caller: &UserSession,
        xml: &str,
        language: Option<&str>,
    ) -> ModelResult<ValidationMessages> {
        caller.check_global_permission(GlobalPermission::SystemAdmin)?;

        let mut messages = ValidationMessages::new();
        let now = Utc::now();
        let mut session = self.store.open_session()?;

        let outcome = (|| -> ModelResult<()> {
            let target = xml::import_characteristics(xml)?;
            let characteristics = restore_characteristics(session.as_mut(), &target, now)?;

            let rules: Vec<RuleRow> = session
                .select_enabled_non_manual_rules()?
                .into_iter()
                .filter(|r| matches_language(r, language))
                .collect();
            let debts = xml::import_rule_debts(xml, &mut messages)?;
            self.restore_rules(
                session.as_mut(),
                &characteristics,
                rules,
                debts,
                &mut messages,
                now,
            )
        })();

        match outcome {
            Ok(()) => {
                session.commit()?;
                info!("debt model restored from XML");
            }
            Err(DebtModelError::Invalid(message)) => {
                debug!(error = %message, "debt model restore rejected");
                messages.add_error(message);
                // session dropped without commit
            }
            Err(other) => return Err(other),
        }
        Ok(messages)
    }

    /// Applies parsed debt entries to the rules in scope, stamps and
    /// persists every rule, reindexes the batch, and reports entries that
    /// matched no rule as warnings.
    fn restore_rules(
        &self,
        session: &mut (dyn StoreSession + '_),
        characteristics: &[CharacteristicRow],
        mut rules: Vec<RuleRow>,
        debts: Vec<RuleDebt>,
        messages: &mut ValidationMessages,
        now: DateTime<Utc>,
    ) -> ModelResult<()> {
        let by_key = index_characteristics(characteristics);
        let mut debts_by_rule: HashMap<RuleKey, RuleDebt> =
            debts.into_iter().map(|d| (d.rule_key.clone(), d)).collect();

        for rule in &mut rules {
            if let Some(debt) = debts_by_rule.remove(&rule.key()) {
                let characteristic = by_key
                    .get(debt.characteristic_key.as_str())
                    .copied()
                    .ok_or_else(|| {
                        DebtModelError::CharacteristicNotFound(debt.characteristic_key.clone())
                    })?;
                set_debt_override(rule, characteristic, &debt.function);
            }
            rule.updated_at = Some(now);
            session.update_rule(rule)?;
        }
        self.index.reindex(&rules);

        let mut unmatched: Vec<RuleKey> = debts_by_rule.into_keys().collect();
        unmatched.sort_by_key(|k| k.to_string());
        for key in unmatched {
            messages.add_warning(format!("rule '{key}' does not exist"));
        }
        Ok(())
    }

    fn load_default_model(&self) -> ModelResult<DebtModel> {
        let mut reader = self.plugins.model_reader(DEFAULT_MODEL_PLUGIN)?;
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        xml::import_characteristics(&text)
    }
}

/// Reconciles the stored characteristic tree against `target`.
///
/// Returns the rows the target resolved to, roots before their subs. Rows
/// absent from the target are disabled in place.
fn restore_characteristics(
    session: &mut (dyn StoreSession + '_),
    target: &DebtModel,
    now: DateTime<Utc>,
) -> ModelResult<Vec<CharacteristicRow>> {
    let mut stored_by_key: HashMap<String, CharacteristicRow> = session
        .select_enabled_characteristics()?
        .into_iter()
        .map(|row| (row.key.clone(), row))
        .collect();

    let mut result: Vec<CharacteristicRow> = Vec::new();
    for root in target.root_characteristics() {
        let root_row = restore_characteristic(session, root, None, &mut stored_by_key, now)?;
        let root_id = root_row.id;
        result.push(root_row);
        for sub in target.sub_characteristics(&root.key) {
            result.push(restore_characteristic(
                session,
                sub,
                Some(root_id),
                &mut stored_by_key,
                now,
            )?);
        }
    }

    // Whatever was not consumed by the target no longer exists: disable
    let mut leftovers: Vec<CharacteristicRow> = stored_by_key.into_values().collect();
    leftovers.sort_by_key(|row| row.id);
    for mut row in leftovers {
        row.enabled = false;
        row.updated_at = Some(now);
        session.update_characteristic(&row)?;
    }
    Ok(result)
}

/// Resolves one target characteristic to a stored row, inserting or
/// updating as needed. Consumes the stored row from `stored_by_key` so the
/// caller can disable the leftovers.
fn restore_characteristic(
    session: &mut (dyn StoreSession + '_),
    target: &Characteristic,
    parent_id: Option<i64>,
    stored_by_key: &mut HashMap<String, CharacteristicRow>,
    now: DateTime<Utc>,
) -> ModelResult<CharacteristicRow> {
    match stored_by_key.remove(&target.key) {
        None => {
            let mut row = CharacteristicRow::new(target.key.as_str(), target.name.as_str());
            row.order = target.order;
            row.parent_id = parent_id;
            row.created_at = Some(now);
            row.id = session.insert_characteristic(&row)?;
            Ok(row)
        }
        Some(mut row) => {
            let changed =
                row.name != target.name || row.order != target.order || row.parent_id != parent_id;
            if changed {
                row.name = target.name.clone();
                row.order = target.order;
                row.parent_id = parent_id;
                row.updated_at = Some(now);
                session.update_characteristic(&row)?;
            }
            Ok(row)
        }
    }
}

/// Builds the in-memory tree from stored rows, partitioning by parent id
fn build_model(rows: &[CharacteristicRow]) -> DebtModel {
    let mut subs_by_parent: HashMap<i64, Vec<&CharacteristicRow>> = HashMap::new();
    for row in rows.iter().filter(|r| !r.is_root()) {
        if let Some(parent_id) = row.parent_id {
            subs_by_parent.entry(parent_id).or_default().push(row);
        }
    }

    let mut model = DebtModel::new();
    for root in rows.iter().filter(|r| r.is_root()) {
        model.add_root(characteristic_from_row(root));
        for sub in subs_by_parent.remove(&root.id).unwrap_or_default() {
            model.add_sub(characteristic_from_row(sub), &root.key);
        }
    }
    model
}

/// The rule's resolved debt, override preferred over default. Rules whose
/// characteristic or function does not resolve carry no debt and are left
/// out of the export.
fn resolved_rule_debt(rule: &RuleRow, model: &DebtModel) -> Option<RuleDebt> {
    let characteristic = model.characteristic_by_id(rule.effective_characteristic_id()?)?;

    let function = if let Some(kind) = rule.function {
        RemediationFunction {
            kind,
            coefficient: rule.coefficient.clone(),
            offset: rule.offset.clone(),
        }
    } else if let Some(kind) = rule.default_function {
        RemediationFunction {
            kind,
            coefficient: rule.default_coefficient.clone(),
            offset: rule.default_offset.clone(),
        }
    } else {
        return None;
    };

    Some(RuleDebt::new(
        rule.key(),
        characteristic.key.clone(),
        function,
    ))
}

fn apply_definition_defaults(
    rule: &mut RuleRow,
    definition: &RuleDefinition,
    characteristics_by_key: &HashMap<&str, &CharacteristicRow>,
) {
    let characteristic = definition
        .characteristic_key
        .as_deref()
        .and_then(|key| characteristics_by_key.get(key));

    match (characteristic, definition.function.as_ref()) {
        (Some(row), Some(function)) => {
            rule.default_characteristic_id = Some(row.id);
            rule.default_function = Some(function.kind);
            rule.default_coefficient = function.coefficient.clone();
            rule.default_offset = function.offset.clone();
        }
        _ => rule.clear_defaults(),
    }
}

fn index_characteristics<'a>(
    rows: &'a [CharacteristicRow],
) -> HashMap<&'a str, &'a CharacteristicRow> {
    rows.iter().map(|row| (row.key.as_str(), row)).collect()
}

fn matches_language(rule: &RuleRow, language: Option<&str>) -> bool {
    match language {
        None => true,
        Some(language) => rule.language.as_deref() == Some(language),
    }
}

fn characteristic_from_row(row: &CharacteristicRow) -> Characteristic {
    Characteristic {
        id: Some(row.id),
        key: row.key.clone(),
        name: row.name.clone(),
        order: row.order,
        parent_id: row.parent_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionKind;

    fn rows() -> Vec<CharacteristicRow> {
        vec![
            CharacteristicRow::new("PORTABILITY", "Portability")
                .with_id(1)
                .with_order(1),
            CharacteristicRow::new("COMPILER", "Compiler")
                .with_id(2)
                .with_parent_id(1),
        ]
    }

    #[test]
    fn test_build_model_partitions_by_parent() {
        let model = build_model(&rows());
        assert_eq!(model.root_characteristics().len(), 1);
        assert_eq!(model.sub_characteristics("PORTABILITY").len(), 1);
        assert_eq!(
            model.characteristic_by_id(2).map(|c| c.key.as_str()),
            Some("COMPILER")
        );
    }

    #[test]
    fn test_resolved_debt_prefers_override() {
        let model = build_model(&rows());
        let mut rule = RuleRow::new("squid", "S1");
        rule.default_characteristic_id = Some(2);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());
        rule.function = Some(FunctionKind::ConstantIssue);
        rule.offset = Some("5min".into());

        let debt = resolved_rule_debt(&rule, &model).unwrap();
        assert_eq!(debt.function.kind, FunctionKind::ConstantIssue);
        assert_eq!(debt.function.offset.as_deref(), Some("5min"));
    }

    #[test]
    fn test_resolved_debt_falls_back_to_default() {
        let model = build_model(&rows());
        let mut rule = RuleRow::new("squid", "S1");
        rule.default_characteristic_id = Some(2);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());

        let debt = resolved_rule_debt(&rule, &model).unwrap();
        assert_eq!(debt.characteristic_key, "COMPILER");
        assert_eq!(debt.function.kind, FunctionKind::Linear);
    }

    #[test]
    fn test_rule_without_function_has_no_debt() {
        let model = build_model(&rows());
        let mut rule = RuleRow::new("squid", "S1");
        rule.default_characteristic_id = Some(2);
        assert!(resolved_rule_debt(&rule, &model).is_none());
    }

    #[test]
    fn test_rule_with_disabled_characteristic_has_no_debt() {
        let model = build_model(&rows());
        let mut rule = RuleRow::new("squid", "S1");
        rule.default_characteristic_id = Some(2);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());
        rule.characteristic_id = Some(crate::store::DISABLED_CHARACTERISTIC_ID);
        assert!(resolved_rule_debt(&rule, &model).is_none());
    }
}
