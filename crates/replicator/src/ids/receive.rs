use std::collections::HashMap;

use crate::wire::NetworkEntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedEntity<E> {
    pub entity: E,
    pub last_seen: u32,
}

/// Maps network ids to local entities on the receiving side and tracks the
/// decode pass each one was last mentioned in.
///
/// Entries not mentioned by a pass are swept at the end of that same pass,
/// so an entry is never more than one generation behind. Comparison is by
/// equality, which keeps the wrapping counter safe.
#[derive(Debug, Clone)]
pub struct ReceiveEntityMap<E> {
    lookup: HashMap<NetworkEntityId, ReceivedEntity<E>>,
    generation: u32,
}

impl<E> Default for ReceiveEntityMap<E> {
    fn default() -> Self {
        Self {
            lookup: HashMap::new(),
            generation: 0,
        }
    }
}

impl<E: Copy> ReceiveEntityMap<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn begin_pass(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn resolve(&self, id: NetworkEntityId) -> Option<E> {
        self.lookup.get(&id).map(|record| record.entity)
    }

    pub fn get(&self, id: NetworkEntityId) -> Option<&ReceivedEntity<E>> {
        self.lookup.get(&id)
    }

    pub fn insert(&mut self, id: NetworkEntityId, entity: E) {
        self.lookup.insert(
            id,
            ReceivedEntity {
                entity,
                last_seen: self.generation,
            },
        );
    }

    pub fn touch(&mut self, id: NetworkEntityId) -> bool {
        match self.lookup.get_mut(&id) {
            Some(record) => {
                record.last_seen = self.generation;
                true
            }
            None => false,
        }
    }

    /// Entries not touched in the current generation, sorted by network id.
    pub fn stale(&self) -> Vec<(NetworkEntityId, E)> {
        let mut stale: Vec<(NetworkEntityId, E)> = self
            .lookup
            .iter()
            .filter(|(_, record)| record.last_seen != self.generation)
            .map(|(id, record)| (*id, record.entity))
            .collect();
        stale.sort_by_key(|(id, _)| *id);
        stale
    }

    /// Drops every entry not touched in the current generation and returns
    /// how many went.
    pub fn sweep(&mut self) -> usize {
        let before = self.lookup.len();
        let generation = self.generation;
        self.lookup.retain(|_, e| e.last_seen == generation);
        before - self.lookup.len()
    }

    pub fn remove(&mut self, id: NetworkEntityId) -> Option<E> {
        self.lookup.remove(&id).map(|record| record.entity)
    }

    pub fn clear(&mut self) {
        self.lookup.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NetworkEntityId, E)> + '_ {
        self.lookup.iter().map(|(id, record)| (*id, record.entity))
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
