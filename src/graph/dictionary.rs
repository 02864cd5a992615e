//! Identifier dictionary
//!
//! Compresses external identifiers into dense node ids. The dictionary only
//! grows within a period; outlier removal drops mappings but never renumbers
//! or reuses dense ids.

use super::types::{ExternalId, NodeIdx};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

#[derive(Debug, Default)]
pub struct Dictionary {
    /// external id -> dense id, in insertion order
    entries: IndexMap<ExternalId, NodeIdx, FxBuildHasher>,

    /// Next dense id to hand out
    next_id: u32,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, external: ExternalId) -> Option<NodeIdx> {
        self.entries.get(&external).copied()
    }

    pub fn contains(&self, external: ExternalId) -> bool {
        self.entries.contains_key(&external)
    }

    /// Map `external` to a fresh dense id.
    ///
    /// Returns the existing id unchanged when `external` is already present.
    pub fn insert(&mut self, external: ExternalId) -> NodeIdx {
        if let Some(&id) = self.entries.get(&external) {
            return id;
        }
        let id = NodeIdx::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(external, id);
        id
    }

    /// Drop every mapping whose dense id fails `keep`, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(NodeIdx) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, id| keep(*id));
        before - self.entries.len()
    }

    /// Live dense ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.entries.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExternalId, NodeIdx)> + '_ {
        self.entries.iter().map(|(ext, id)| (*ext, *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of dense ids ever allocated
    pub fn allocated(&self) -> usize {
        self.next_id as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut dict = Dictionary::new();
        let a = dict.insert(ExternalId(10));
        let b = dict.insert(ExternalId(20));
        assert_eq!(a, NodeIdx(0));
        assert_eq!(b, NodeIdx(1));
        assert_eq!(dict.insert(ExternalId(10)), a);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut dict = Dictionary::new();
        dict.insert(ExternalId(1));
        dict.insert(ExternalId(2));
        assert_eq!(dict.retain(|id| id != NodeIdx(0)), 1);
        assert!(!dict.contains(ExternalId(1)));

        // re-entry gets a new dense id
        assert_eq!(dict.insert(ExternalId(1)), NodeIdx(2));
        assert_eq!(dict.allocated(), 3);
        assert_eq!(dict.ids().collect::<Vec<_>>(), vec![NodeIdx(1), NodeIdx(2)]);
    }
}
