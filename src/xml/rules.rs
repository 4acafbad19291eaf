//! Rule debt importer.
//!
//! Extracts `<rule>` entries from a backup document. Broken markup aborts
//! with an illegal-input error; an entry that is merely incomplete or
//! carries an unparseable function is reported as a validation error and
//! skipped, so one bad entry does not sink the rest of the document.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::DebtModelError;
use crate::model::{FunctionKind, RemediationFunction, RuleDebt};
use crate::rule::RuleKey;
use crate::validation::ValidationMessages;

use super::{
    invalid_xml, read_leaf_text, skip_element, ELEM_CHARACTERISTIC, ELEM_COEFFICIENT,
    ELEM_FUNCTION, ELEM_KEY, ELEM_OFFSET, ELEM_REPOSITORY, ELEM_RULE,
};

#[derive(Debug, Default)]
struct RuleEntry {
    repository: Option<String>,
    key: Option<String>,
    characteristic: Option<String>,
    function: Option<String>,
    coefficient: Option<String>,
    offset: Option<String>,
}

/// Parses the rule-debt half of a backup document
pub fn import_rule_debts(
    xml: &str,
    messages: &mut ValidationMessages,
) -> Result<Vec<RuleDebt>, DebtModelError> {
    let mut debts: Vec<RuleDebt> = Vec::new();
    super::for_each_top_level(xml, |reader, start| {
        if start.name().as_ref() == ELEM_RULE.as_bytes() {
            let entry = parse_rule_entry(reader)?;
            if let Some(debt) = build_debt(entry, messages) {
                debts.push(debt);
            }
        } else {
            skip_element(reader, start)?;
        }
        Ok(())
    })?;
    Ok(debts)
}

fn parse_rule_entry(reader: &mut Reader<&[u8]>) -> Result<RuleEntry, DebtModelError> {
    let mut entry = RuleEntry::default();
    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Start(start) => match start.name().as_ref() {
                n if n == ELEM_REPOSITORY.as_bytes() => {
                    entry.repository = Some(read_leaf_text(reader, &start)?);
                }
                n if n == ELEM_KEY.as_bytes() => {
                    entry.key = Some(read_leaf_text(reader, &start)?);
                }
                n if n == ELEM_CHARACTERISTIC.as_bytes() => {
                    entry.characteristic = Some(read_leaf_text(reader, &start)?);
                }
                n if n == ELEM_FUNCTION.as_bytes() => {
                    entry.function = Some(read_leaf_text(reader, &start)?);
                }
                n if n == ELEM_COEFFICIENT.as_bytes() => {
                    entry.coefficient = Some(read_leaf_text(reader, &start)?);
                }
                n if n == ELEM_OFFSET.as_bytes() => {
                    entry.offset = Some(read_leaf_text(reader, &start)?);
                }
                _ => skip_element(reader, &start)?,
            },
            Event::End(end) if end.name().as_ref() == ELEM_RULE.as_bytes() => break,
            Event::Eof => {
                return Err(DebtModelError::invalid("unexpected end of document"));
            }
            _ => {}
        }
    }
    Ok(entry)
}

/// Turns a raw entry into a `RuleDebt`, recording a validation error and
/// returning `None` when the entry cannot be applied.
fn build_debt(entry: RuleEntry, messages: &mut ValidationMessages) -> Option<RuleDebt> {
    let (repository, key) = match (entry.repository, entry.key) {
        (Some(repository), Some(key)) => (repository, key),
        _ => {
            messages.add_error("a rule entry is missing its repository or key");
            return None;
        }
    };
    let rule_key = RuleKey::of(repository, key);

    let Some(characteristic) = entry.characteristic else {
        messages.add_error(format!("rule '{rule_key}' has no characteristic"));
        return None;
    };
    let Some(function_text) = entry.function else {
        messages.add_error(format!("rule '{rule_key}' has no remediation function"));
        return None;
    };

    let kind = match function_text.parse::<FunctionKind>() {
        Ok(kind) => kind,
        Err(err) => {
            messages.add_error(format!("rule '{rule_key}': {err}"));
            return None;
        }
    };
    match RemediationFunction::new(kind, entry.coefficient, entry.offset) {
        Ok(function) => Some(RuleDebt::new(rule_key, characteristic, function)),
        Err(err) => {
            messages.add_error(format!("rule '{rule_key}': {err}"));
            None
        }
    }
}
