//! Domain model for the debt taxonomy.
//!
//! `DebtModel` is the in-memory characteristic tree used on both sides of a
//! backup: built from stored rows on export, parsed from XML on restore.
//! `RuleDebt` is the per-rule unit of a backup document.

mod characteristic;
mod function;

pub use characteristic::{Characteristic, DebtModel};
pub use function::{FunctionKind, RemediationFunction};

use serde::{Deserialize, Serialize};

use crate::rule::RuleKey;

/// Resolved debt of one rule, as carried by a backup document.
///
/// Valid only with both a characteristic key and a function; rules without a
/// resolvable pair are simply absent from the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDebt {
    pub rule_key: RuleKey,
    /// Key of the sub-characteristic the debt is filed under
    pub characteristic_key: String,
    pub function: RemediationFunction,
}

impl RuleDebt {
    pub fn new(
        rule_key: RuleKey,
        characteristic_key: impl Into<String>,
        function: RemediationFunction,
    ) -> Self {
        Self {
            rule_key,
            characteristic_key: characteristic_key.into(),
            function,
        }
    }
}
