//! In-memory temporal graph state
//!
//! Owns the identifier dictionary and the node record store and keeps them
//! in lockstep: a record exists iff its dense id is mapped in the dictionary.

use super::dictionary::Dictionary;
use super::record::NodeRecord;
use super::types::{ExternalId, NodeIdx, Status};
use thiserror::Error;

/// Errors that can occur during graph state operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeIdx),

    #[error("Dictionary and record store disagree on {0}")]
    Inconsistent(NodeIdx),

    #[error("Aggregator returned {found} profiles for {expected} nodes")]
    ProfileCount { expected: usize, found: usize },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Result of resolving an external identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Mapped and backed by a record
    Live(NodeIdx),
    /// Mapped, but the record has been evicted
    Evicted(NodeIdx),
    /// Not in the dictionary
    Absent,
}

impl Presence {
    pub fn live(self) -> Option<NodeIdx> {
        match self {
            Presence::Live(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_mapped(self) -> bool {
        !matches!(self, Presence::Absent)
    }
}

/// Dictionary plus record store, carried across periods by the driver
#[derive(Debug, Default)]
pub struct TemporalGraph {
    dictionary: Dictionary,

    /// Record arena indexed by dense id; evicted slots are `None`.
    /// Records are boxed so a dead slot costs one pointer.
    records: Vec<Option<Box<NodeRecord>>>,

    /// Number of `Some` slots
    live: usize,
}

impl TemporalGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn resolve(&self, external: ExternalId) -> Presence {
        match self.dictionary.get(external) {
            Some(id) if self.has_record(id) => Presence::Live(id),
            Some(id) => Presence::Evicted(id),
            None => Presence::Absent,
        }
    }

    /// Map `external` to a new node with the given status, or return the live
    /// node already mapped. A mapping without a record is left untouched.
    pub fn insert(&mut self, external: ExternalId, status: Status) -> Presence {
        match self.resolve(external) {
            Presence::Absent => {}
            other => return other,
        }
        let id = self.dictionary.insert(external);
        let mut record = NodeRecord::new(id, external);
        record.set_status(status);

        let idx = id.as_usize();
        if idx >= self.records.len() {
            self.records.resize_with(idx + 1, || None);
        }
        self.records[idx] = Some(Box::new(record));
        self.live += 1;
        Presence::Live(id)
    }

    pub fn has_record(&self, id: NodeIdx) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeIdx) -> Option<&NodeRecord> {
        self.records.get(id.as_usize()).and_then(|slot| slot.as_deref())
    }

    pub fn get_mut(&mut self, id: NodeIdx) -> Option<&mut NodeRecord> {
        self.records.get_mut(id.as_usize()).and_then(|slot| slot.as_deref_mut())
    }

    /// Borrow two distinct records mutably at once
    pub fn get_pair_mut(
        &mut self,
        a: NodeIdx,
        b: NodeIdx,
    ) -> Option<(&mut NodeRecord, &mut NodeRecord)> {
        let (ia, ib) = (a.as_usize(), b.as_usize());
        if ia == ib || ia >= self.records.len() || ib >= self.records.len() {
            return None;
        }
        let (low, high) = (ia.min(ib), ia.max(ib));
        let (head, tail) = self.records.split_at_mut(high);
        let first = head[low].as_deref_mut()?;
        let second = tail[0].as_deref_mut()?;
        if ia < ib {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    /// Remove the records for `ids` together with their dictionary entries.
    ///
    /// Ids without a record are ignored. Returns how many records were removed.
    pub fn evict(&mut self, ids: &[NodeIdx]) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(slot) = self.records.get_mut(id.as_usize()) {
                if slot.take().is_some() {
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            self.live -= removed;
            let records = &self.records;
            self.dictionary
                .retain(|id| records.get(id.as_usize()).is_some_and(Option::is_some));
        }
        removed
    }

    /// Live dense ids in dictionary order
    pub fn ids(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.dictionary.ids().filter(|id| self.has_record(*id))
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> + '_ {
        self.records.iter().filter_map(|slot| slot.as_deref())
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut NodeRecord> + '_ {
        self.records.iter_mut().filter_map(|slot| slot.as_deref_mut())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of dense ids ever allocated
    pub fn allocated(&self) -> usize {
        self.dictionary.allocated()
    }

    /// Check that dictionary entries and records match one to one
    pub fn check_consistency(&self) -> GraphResult<()> {
        for id in self.dictionary.ids() {
            if !self.has_record(id) {
                return Err(GraphError::Inconsistent(id));
            }
        }
        for record in self.records() {
            if self.dictionary.get(record.external) != Some(record.id) {
                return Err(GraphError::Inconsistent(record.id));
            }
        }
        Ok(())
    }
}
