//! # Caller identity and permission gate
//!
//! Every backup/restore/reset entry point takes the acting session as an
//! explicit parameter and checks it before any data is read or written.
//!
//! ## Invariants
//! - A missing permission aborts the operation with no partial state change
//! - Anonymous sessions never hold a global permission

use std::collections::HashSet;
use std::fmt;

use crate::error::{DebtModelError, ModelResult};

/// Server-wide permissions a session may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalPermission {
    /// Administer the server, including the debt model
    SystemAdmin,
    /// Administer quality profiles
    QualityProfileAdmin,
    /// Provision new projects
    Provisioning,
}

impl GlobalPermission {
    /// Stable string key, as stored by the permission backend
    pub fn key(&self) -> &'static str {
        match self {
            GlobalPermission::SystemAdmin => "admin",
            GlobalPermission::QualityProfileAdmin => "profileadmin",
            GlobalPermission::Provisioning => "provisioning",
        }
    }
}

impl fmt::Display for GlobalPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The acting user's identity, carried with each request
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    login: Option<String>,
    permissions: HashSet<GlobalPermission>,
}

impl UserSession {
    /// Session for an unauthenticated caller
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for an authenticated user with no permissions yet
    pub fn authenticated(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            permissions: HashSet::new(),
        }
    }

    /// Grants a global permission to this session
    pub fn with_permission(mut self, permission: GlobalPermission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn has_global_permission(&self, permission: GlobalPermission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Errors with `Unauthorized` unless the session holds `permission`
    pub fn check_global_permission(&self, permission: GlobalPermission) -> ModelResult<()> {
        if self.has_global_permission(permission) {
            Ok(())
        } else {
            Err(DebtModelError::Unauthorized(permission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_holds_nothing() {
        let session = UserSession::anonymous();
        assert_eq!(session.login(), None);
        assert!(!session.has_global_permission(GlobalPermission::SystemAdmin));
    }

    #[test]
    fn test_check_passes_with_granted_permission() {
        let session =
            UserSession::authenticated("admin").with_permission(GlobalPermission::SystemAdmin);
        assert!(session
            .check_global_permission(GlobalPermission::SystemAdmin)
            .is_ok());
    }

    #[test]
    fn test_check_fails_without_permission() {
        let session = UserSession::authenticated("dev");
        let err = session
            .check_global_permission(GlobalPermission::SystemAdmin)
            .unwrap_err();
        assert!(matches!(err, DebtModelError::Unauthorized(_)));
        assert!(err.to_string().contains("admin"));
    }
}
