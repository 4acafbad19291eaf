//! # Storage collaborator contracts
//!
//! The relational engine behind the debt model is external; this module
//! defines the session-scoped contract the reconciliation code programs
//! against, plus an in-memory reference implementation.
//!
//! ## Invariants
//! - One session per operation; all reads and writes go through it
//! - Writes become visible only on `commit`; dropping a session without
//!   committing releases it with no visible change

mod memory;
mod rows;

pub use memory::MemoryStore;
pub use rows::{CharacteristicRow, RuleRow, DISABLED_CHARACTERISTIC_ID};

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a storage backend
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("characteristic with id {0} does not exist")]
    UnknownCharacteristic(i64),

    #[error("rule with id {0} does not exist")]
    UnknownRule(i64),

    #[error("{0}")]
    Backend(String),
}

/// Factory for request-scoped store sessions
pub trait ModelStore {
    /// Opens a unit-of-work session. The session borrows the store and must
    /// not outlive it.
    fn open_session(&self) -> StoreResult<Box<dyn StoreSession + '_>>;
}

/// A unit of work over characteristics and rules.
///
/// Reads observe the state as of session open plus the session's own writes.
/// `commit` consumes the session; a session dropped without commit leaves the
/// store untouched.
pub trait StoreSession {
    /// All enabled characteristics, roots and subs
    fn select_enabled_characteristics(&self) -> StoreResult<Vec<CharacteristicRow>>;

    /// Inserts a characteristic and returns its assigned id
    fn insert_characteristic(&mut self, row: &CharacteristicRow) -> StoreResult<i64>;

    /// Updates a characteristic by id
    fn update_characteristic(&mut self, row: &CharacteristicRow) -> StoreResult<()>;

    /// All enabled rules that are not manually created
    fn select_enabled_non_manual_rules(&self) -> StoreResult<Vec<RuleRow>>;

    /// Updates a rule by id
    fn update_rule(&mut self, row: &RuleRow) -> StoreResult<()>;

    /// Makes the session's writes visible to subsequent sessions
    fn commit(self: Box<Self>) -> StoreResult<()>;
}
