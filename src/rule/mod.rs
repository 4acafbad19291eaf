//! Rule identity and rule-level edits.

mod operations;
mod update;

pub use operations::{apply_update, set_debt_override};
pub use update::{CharacteristicTarget, Patch, RuleUpdate};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a rule by its repository and key within that repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    repository: String,
    rule: String,
}

impl RuleKey {
    pub fn of(repository: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            rule: rule.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_repository_and_rule() {
        let key = RuleKey::of("squid", "S1135");
        assert_eq!(key.to_string(), "squid:S1135");
        assert_eq!(key.repository(), "squid");
        assert_eq!(key.rule(), "S1135");
    }
}
