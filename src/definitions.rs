//! Rule definition loader contract.
//!
//! Definitions are the plugin-declared shape of each rule, including its
//! definition-time debt. The loader is external; resets consult it to
//! rebuild default debt columns.

use crate::model::RemediationFunction;
use crate::rule::RuleKey;

/// Definition-time debt metadata of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub key: RuleKey,
    /// Sub-characteristic the rule files its debt under, when any
    pub characteristic_key: Option<String>,
    pub function: Option<RemediationFunction>,
}

impl RuleDefinition {
    pub fn new(key: RuleKey) -> Self {
        Self {
            key,
            characteristic_key: None,
            function: None,
        }
    }

    pub fn with_debt(
        mut self,
        characteristic_key: impl Into<String>,
        function: RemediationFunction,
    ) -> Self {
        self.characteristic_key = Some(characteristic_key.into());
        self.function = Some(function);
        self
    }
}

/// Loads the rule definitions currently installed on the server.
///
/// Custom rules have no definition and are simply absent from the result.
pub trait RuleDefinitionsLoader {
    fn load(&self) -> Vec<RuleDefinition>;
}
