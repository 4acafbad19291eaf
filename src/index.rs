//! Search index contract.
//!
//! Rule mutations must be pushed to the search subsystem after they are
//! persisted; reconciliation hands over the full batch of touched rows once
//! per operation. `rule_document` is the JSON shape index backends ingest.

use serde_json::json;

use crate::store::RuleRow;

/// Receives rule rows whose stored state changed
pub trait RuleIndex {
    fn reindex(&self, rules: &[RuleRow]);
}

/// The index document for one rule: identity plus its resolved debt columns
pub fn rule_document(rule: &RuleRow) -> serde_json::Value {
    // The function and its parameters resolve as one quad; mixing an
    // override function with default parameters would misstate the debt
    let (function, coefficient, offset) = if rule.function.is_some() {
        (rule.function, &rule.coefficient, &rule.offset)
    } else {
        (
            rule.default_function,
            &rule.default_coefficient,
            &rule.default_offset,
        )
    };
    json!({
        "id": rule.id,
        "repository": rule.repository_key,
        "key": rule.rule_key,
        "language": rule.language,
        "tags": rule.tags,
        "characteristic_id": rule.effective_characteristic_id(),
        "function": function,
        "coefficient": coefficient,
        "offset": offset,
        "updated_at": rule.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionKind;

    #[test]
    fn test_document_resolves_override_before_default() {
        let mut rule = RuleRow::new("squid", "S1067").with_id(7);
        rule.default_characteristic_id = Some(2);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());
        rule.characteristic_id = Some(4);
        rule.function = Some(FunctionKind::ConstantIssue);
        rule.offset = Some("10min".into());

        let document = rule_document(&rule);
        assert_eq!(document["characteristic_id"], 4);
        assert_eq!(document["function"], "CONSTANT_ISSUE");
        assert_eq!(document["offset"], "10min");
        assert_eq!(document["repository"], "squid");
    }

    #[test]
    fn test_document_falls_back_to_defaults() {
        let mut rule = RuleRow::new("squid", "S1067").with_id(7);
        rule.default_characteristic_id = Some(2);
        rule.default_function = Some(FunctionKind::Linear);
        rule.default_coefficient = Some("30min".into());

        let document = rule_document(&rule);
        assert_eq!(document["characteristic_id"], 2);
        assert_eq!(document["function"], "LINEAR");
        assert_eq!(document["coefficient"], "30min");
    }
}
