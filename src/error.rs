//! Error types for debt model administration.
//!
//! A single error enum covers every operation. Input problems raised while
//! restoring from XML (`Invalid`) are caught by the restore entry point and
//! turned into validation messages; everything else propagates to the caller.

use thiserror::Error;

use crate::auth::GlobalPermission;
use crate::store::StoreError;

/// Result type for debt model operations
pub type ModelResult<T> = Result<T, DebtModelError>;

/// Errors raised by backup, restore and rule update operations
#[derive(Debug, Error)]
pub enum DebtModelError {
    /// Caller lacks the required global permission. Raised before any data
    /// is read or written.
    #[error("insufficient privileges: global permission '{0}' is required")]
    Unauthorized(GlobalPermission),

    /// A characteristic key referenced during restore does not exist in the
    /// stored tree. Aborts the whole restore, nothing is committed.
    #[error("characteristic '{0}' has not been found")]
    CharacteristicNotFound(String),

    /// Malformed XML or an otherwise illegal input value. During an XML
    /// restore this is converted into a validation error message instead of
    /// being returned to the caller.
    #[error("{0}")]
    Invalid(String),

    /// Storage collaborator failure
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    /// The plugin repository could not supply the bundled model
    #[error("failed to read bundled debt model: {0}")]
    PluginModel(#[from] std::io::Error),

    /// XML serialization failure while exporting
    #[error("xml serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl DebtModelError {
    /// Shorthand for an illegal-input error
    pub fn invalid(message: impl Into<String>) -> Self {
        DebtModelError::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_key() {
        let err = DebtModelError::CharacteristicNotFound("MODULARITY".to_string());
        assert_eq!(
            err.to_string(),
            "characteristic 'MODULARITY' has not been found"
        );
    }

    #[test]
    fn test_invalid_displays_bare_message() {
        let err = DebtModelError::invalid("unexpected end of document");
        assert_eq!(err.to_string(), "unexpected end of document");
    }
}
