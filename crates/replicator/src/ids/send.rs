use std::collections::HashMap;
use std::hash::Hash;

use crate::wire::NetworkEntityId;

use super::IdError;

/// Hands out network ids for local entities on the sending side.
///
/// Ids are never reused within a session; `0xFFFF` is never assigned.
#[derive(Debug, Clone)]
pub struct SendEntityMap<E> {
    lookup: HashMap<E, NetworkEntityId>,
    next_id: u16,
}

impl<E> Default for SendEntityMap<E> {
    fn default() -> Self {
        Self {
            lookup: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E> SendEntityMap<E>
where
    E: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, entity: E) -> Result<NetworkEntityId, IdError> {
        if let Some(id) = self.lookup.get(&entity) {
            return Ok(*id);
        }

        let id = NetworkEntityId(self.next_id);
        if id.is_end() {
            return Err(IdError::NetworkIdsExhausted(self.lookup.len()));
        }
        self.next_id += 1;
        self.lookup.insert(entity, id);
        Ok(id)
    }

    pub fn get(&self, entity: E) -> Option<NetworkEntityId> {
        self.lookup.get(&entity).copied()
    }

    pub fn next_id(&self) -> NetworkEntityId {
        NetworkEntityId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
