//! debtmodel — technical debt model administration for a code-quality server
//!
//! Backs up the hierarchical debt model (characteristics, sub-characteristics
//! and per-rule remediation functions) to XML, restores it from a document or
//! from the bundled plugin default by diffing against the stored tree, and
//! carries the patch-style update request used for rule metadata edits.
//!
//! Storage, rule definitions, the search index and the plugin repository are
//! collaborator traits; `store::MemoryStore` is the bundled reference
//! implementation.

pub mod auth;
pub mod backup;
pub mod definitions;
pub mod error;
pub mod index;
pub mod model;
pub mod plugin;
pub mod rule;
pub mod store;
pub mod validation;
pub mod xml;

pub use backup::ModelBackup;
pub use error::{DebtModelError, ModelResult};
pub use validation::ValidationMessages;
