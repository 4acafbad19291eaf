//! Validation message accumulator for restore operations.
//!
//! Restore entry points return the accumulated messages to the caller instead
//! of throwing on recoverable input problems: errors describe entries that
//! could not be applied, warnings describe entries that were skipped.

use serde::Serialize;

/// Ordered error/warning/info messages produced while importing a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationMessages {
    errors: Vec<String>,
    warnings: Vec<String>,
    infos: Vec<String>,
}

impl ValidationMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.infos.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.infos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_insertion_order() {
        let mut messages = ValidationMessages::new();
        messages.add_error("first");
        messages.add_error("second");
        messages.add_warning("skipped");

        assert_eq!(messages.errors(), ["first", "second"]);
        assert_eq!(messages.warnings(), ["skipped"]);
        assert!(messages.has_errors());
        assert!(messages.has_warnings());
        assert!(!messages.is_empty());
    }

    #[test]
    fn test_new_messages_are_empty() {
        let messages = ValidationMessages::new();
        assert!(messages.is_empty());
        assert!(!messages.has_errors());
    }
}
