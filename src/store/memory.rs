//! In-memory store.
//!
//! Reference implementation of the store contract, used by the integration
//! tests and suitable for embedding. Sessions take a copy of the shared
//! state on open and write it back atomically on commit, which makes the
//! no-partial-commit guarantee of the contract observable.

use std::sync::{Arc, Mutex};

use super::rows::{CharacteristicRow, RuleRow};
use super::{ModelStore, StoreError, StoreResult, StoreSession};

#[derive(Debug, Clone)]
struct MemoryState {
    characteristics: Vec<CharacteristicRow>,
    rules: Vec<RuleRow>,
    next_characteristic_id: i64,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            characteristics: Vec::new(),
            rules: Vec::new(),
            next_characteristic_id: 1,
        }
    }
}

/// Shared in-memory store; cheap to clone, clones share state
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with rows. Ids of seeded rows must be set by the
    /// caller; the id sequence continues past the largest seeded id.
    pub fn seeded(characteristics: Vec<CharacteristicRow>, rules: Vec<RuleRow>) -> Self {
        let next_characteristic_id = characteristics.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                characteristics,
                rules,
                next_characteristic_id,
            })),
        }
    }

    /// Snapshot of all characteristic rows, disabled ones included
    pub fn characteristics(&self) -> Vec<CharacteristicRow> {
        match self.state.lock() {
            Ok(state) => state.characteristics.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Snapshot of all rule rows
    pub fn rules(&self) -> Vec<RuleRow> {
        match self.state.lock() {
            Ok(state) => state.rules.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl ModelStore for MemoryStore {
    fn open_session(&self) -> StoreResult<Box<dyn StoreSession + '_>> {
        let work = self.lock()?.clone();
        Ok(Box::new(MemorySession { store: self, work }))
    }
}

struct MemorySession<'a> {
    store: &'a MemoryStore,
    work: MemoryState,
}

impl StoreSession for MemorySession<'_> {
    fn select_enabled_characteristics(&self) -> StoreResult<Vec<CharacteristicRow>> {
        Ok(self
            .work
            .characteristics
            .iter()
            .filter(|c| c.enabled)
            .cloned()
            .collect())
    }

    fn insert_characteristic(&mut self, row: &CharacteristicRow) -> StoreResult<i64> {
        let id = self.work.next_characteristic_id;
        self.work.next_characteristic_id += 1;
        let mut row = row.clone();
        row.id = id;
        self.work.characteristics.push(row);
        Ok(id)
    }

    fn update_characteristic(&mut self, row: &CharacteristicRow) -> StoreResult<()> {
        let slot = self
            .work
            .characteristics
            .iter_mut()
            .find(|c| c.id == row.id)
            .ok_or(StoreError::UnknownCharacteristic(row.id))?;
        *slot = row.clone();
        Ok(())
    }

    fn select_enabled_non_manual_rules(&self) -> StoreResult<Vec<RuleRow>> {
        Ok(self
            .work
            .rules
            .iter()
            .filter(|r| r.enabled && !r.manual)
            .cloned()
            .collect())
    }

    fn update_rule(&mut self, row: &RuleRow) -> StoreResult<()> {
        let slot = self
            .work
            .rules
            .iter_mut()
            .find(|r| r.id == row.id)
            .ok_or(StoreError::UnknownRule(row.id))?;
        *slot = row.clone();
        Ok(())
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        *self.store.lock()? = self.work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let mut session = store.open_session().unwrap();
        let first = session
            .insert_characteristic(&CharacteristicRow::new("A", "Alpha"))
            .unwrap();
        let second = session
            .insert_characteristic(&CharacteristicRow::new("B", "Beta"))
            .unwrap();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_writes_invisible_until_commit() {
        let store = MemoryStore::new();
        {
            let mut session = store.open_session().unwrap();
            session
                .insert_characteristic(&CharacteristicRow::new("A", "Alpha"))
                .unwrap();
            // dropped without commit
        }
        assert!(store.characteristics().is_empty());

        let mut session = store.open_session().unwrap();
        session
            .insert_characteristic(&CharacteristicRow::new("A", "Alpha"))
            .unwrap();
        session.commit().unwrap();
        assert_eq!(store.characteristics().len(), 1);
    }

    #[test]
    fn test_selects_filter_disabled_and_manual() {
        let mut disabled = CharacteristicRow::new("OLD", "Old").with_id(1);
        disabled.enabled = false;
        let enabled = CharacteristicRow::new("NEW", "New").with_id(2);

        let mut manual = RuleRow::new("manual", "custom").with_id(1);
        manual.manual = true;
        let plain = RuleRow::new("squid", "S001").with_id(2);

        let store = MemoryStore::seeded(vec![disabled, enabled], vec![manual, plain]);
        let session = store.open_session().unwrap();

        let characteristics = session.select_enabled_characteristics().unwrap();
        assert_eq!(characteristics.len(), 1);
        assert_eq!(characteristics[0].key, "NEW");

        let rules = session.select_enabled_non_manual_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_key, "S001");
    }

    #[test]
    fn test_seeded_id_sequence_continues() {
        let store = MemoryStore::seeded(vec![CharacteristicRow::new("A", "Alpha").with_id(5)], vec![]);
        let mut session = store.open_session().unwrap();
        let id = session
            .insert_characteristic(&CharacteristicRow::new("B", "Beta"))
            .unwrap();
        assert_eq!(id, 6);
    }

    #[test]
    fn test_update_unknown_row_fails() {
        let store = MemoryStore::new();
        let mut session = store.open_session().unwrap();
        let err = session
            .update_characteristic(&CharacteristicRow::new("A", "Alpha").with_id(42))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownCharacteristic(42)));
    }
}
