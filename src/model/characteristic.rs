//! In-memory debt characteristic tree.
//!
//! The tree is two levels deep: root characteristics carry a display order,
//! sub-characteristics hang under exactly one root. Rules attach their debt
//! to sub-characteristics only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named category of the debt taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Database id, absent for characteristics parsed from XML
    pub id: Option<i64>,
    pub key: String,
    pub name: String,
    /// Display order, set on roots only
    pub order: Option<i32>,
    pub parent_id: Option<i64>,
}

impl Characteristic {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            name: name.into(),
            order: None,
            parent_id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_parent_id(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// The debt model tree: roots plus their sub-characteristics
#[derive(Debug, Clone, Default)]
pub struct DebtModel {
    roots: Vec<Characteristic>,
    subs_by_root: HashMap<String, Vec<Characteristic>>,
}

impl DebtModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, characteristic: Characteristic) -> &mut Self {
        self.roots.push(characteristic);
        self
    }

    /// Attaches `characteristic` under the root identified by `root_key`.
    /// The root does not have to be added first; ordering only matters for
    /// the reconciliation pass, which walks roots before children.
    pub fn add_sub(&mut self, characteristic: Characteristic, root_key: &str) -> &mut Self {
        self.subs_by_root
            .entry(root_key.to_string())
            .or_default()
            .push(characteristic);
        self
    }

    pub fn root_characteristics(&self) -> &[Characteristic] {
        &self.roots
    }

    pub fn sub_characteristics(&self, root_key: &str) -> &[Characteristic] {
        self.subs_by_root
            .get(root_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Looks up any characteristic, root or sub, by key
    pub fn characteristic_by_key(&self, key: &str) -> Option<&Characteristic> {
        self.all().find(|c| c.key == key)
    }

    /// Looks up any characteristic, root or sub, by database id
    pub fn characteristic_by_id(&self, id: i64) -> Option<&Characteristic> {
        self.all().find(|c| c.id == Some(id))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.subs_by_root.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &Characteristic> {
        self.roots
            .iter()
            .chain(self.subs_by_root.values().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> DebtModel {
        let mut model = DebtModel::new();
        model.add_root(
            Characteristic::new("PORTABILITY", "Portability")
                .with_id(1)
                .with_order(1),
        );
        model.add_sub(
            Characteristic::new("COMPILER", "Compiler")
                .with_id(2)
                .with_parent_id(1),
            "PORTABILITY",
        );
        model
    }

    #[test]
    fn test_lookup_by_key_covers_roots_and_subs() {
        let model = sample_model();
        assert_eq!(
            model.characteristic_by_key("PORTABILITY").map(|c| c.id),
            Some(Some(1))
        );
        assert_eq!(
            model.characteristic_by_key("COMPILER").map(|c| c.id),
            Some(Some(2))
        );
        assert!(model.characteristic_by_key("UNKNOWN").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        let model = sample_model();
        assert_eq!(
            model.characteristic_by_id(2).map(|c| c.key.as_str()),
            Some("COMPILER")
        );
        assert!(model.characteristic_by_id(99).is_none());
    }

    #[test]
    fn test_subs_are_grouped_under_their_root() {
        let model = sample_model();
        let subs = model.sub_characteristics("PORTABILITY");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].key, "COMPILER");
        assert!(model.sub_characteristics("EFFICIENCY").is_empty());
    }

    #[test]
    fn test_root_flag_follows_parent() {
        let model = sample_model();
        assert!(model.root_characteristics()[0].is_root());
        assert!(!model.sub_characteristics("PORTABILITY")[0].is_root());
    }
}
