use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::{ComponentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u32);

impl EntityHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSlot {
    pub data: Vec<u8>,
    pub enabled: bool,
}

impl ComponentSlot {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredEntity<K> {
    components: Vec<(K, ComponentSlot)>,
}

impl<K: PartialEq> StoredEntity<K> {
    fn slot(&self, kind: &K) -> Option<&ComponentSlot> {
        self.components
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, slot)| slot)
    }

    fn slot_mut(&mut self, kind: &K) -> Option<&mut ComponentSlot> {
        self.components
            .iter_mut()
            .find(|(k, _)| k == kind)
            .map(|(_, slot)| slot)
    }
}

/// Entity table holding raw component payloads, for tests, demos and
/// hosts without a store of their own.
#[derive(Debug, Clone)]
pub struct MemoryWorld<K> {
    entities: HashMap<u32, StoredEntity<K>>,
    next_entity_id: u32,
}

impl<K> Default for MemoryWorld<K> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            next_entity_id: 1,
        }
    }
}

impl<K> MemoryWorld<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityHandle {
        let id = self.allocate_id();
        self.entities.insert(
            id,
            StoredEntity {
                components: Vec::new(),
            },
        );
        EntityHandle(id)
    }

    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        self.entities.remove(&handle.0).is_some()
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(&handle.0)
    }

    /// Attaches or overwrites a component. New components start enabled.
    pub fn insert(&mut self, handle: EntityHandle, kind: K, data: &[u8]) -> bool {
        let Some(entity) = self.entities.get_mut(&handle.0) else {
            return false;
        };
        let data = data.to_vec();
        match entity.slot_mut(&kind) {
            Some(slot) => slot.data = data,
            None => {
                let slot = ComponentSlot {
                    data,
                    enabled: true,
                };
                entity.components.push((kind, slot));
            }
        }
        true
    }

    pub fn remove(&mut self, handle: EntityHandle, kind: K) -> Option<Vec<u8>> {
        let entity = self.entities.get_mut(&handle.0)?;
        let index = entity.components.iter().position(|(k, _)| *k == kind)?;
        Some(entity.components.remove(index).1.data)
    }

    pub fn get(&self, handle: EntityHandle, kind: K) -> Option<&[u8]> {
        self.slot(handle, kind).map(|slot| slot.data.as_slice())
    }

    pub fn slot(&self, handle: EntityHandle, kind: K) -> Option<&ComponentSlot> {
        self.entities.get(&handle.0)?.slot(&kind)
    }

    pub fn toggle(&mut self, handle: EntityHandle, kind: K, enabled: bool) -> bool {
        match self
            .entities
            .get_mut(&handle.0)
            .and_then(|entity| entity.slot_mut(&kind))
        {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn components(&self, handle: EntityHandle) -> impl Iterator<Item = (K, &ComponentSlot)> {
        let components: &[(K, ComponentSlot)] = match self.entities.get(&handle.0) {
            Some(entity) => entity.components.as_slice(),
            None => &[],
        };
        components.iter().map(|(kind, slot)| (*kind, slot))
    }

    /// Live handles in ascending order.
    pub fn handles(&self) -> Vec<EntityHandle> {
        let mut handles = Vec::with_capacity(self.entities.len());
        handles.extend(self.entities.keys().map(|id| EntityHandle(*id)));
        handles.sort_unstable();
        handles
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    fn entity(&self, handle: EntityHandle) -> Result<&StoredEntity<K>, StoreError> {
        self.entities
            .get(&handle.0)
            .ok_or_else(|| StoreError::no_such_entity(handle))
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> Result<&mut StoredEntity<K>, StoreError> {
        self.entities
            .get_mut(&handle.0)
            .ok_or_else(|| StoreError::no_such_entity(handle))
    }
}

impl<K> ComponentStore for MemoryWorld<K>
where
    K: Copy + Eq + Hash + Debug,
{
    type Entity = EntityHandle;
    type Kind = K;

    fn contains_entity(&self, entity: EntityHandle) -> bool {
        self.contains(entity)
    }

    fn component_kinds(&self, entity: EntityHandle, out: &mut Vec<K>) -> Result<(), StoreError> {
        let stored = self.entity(entity)?;
        out.extend(stored.components.iter().map(|(kind, _)| *kind));
        Ok(())
    }

    fn is_enabled(&self, entity: EntityHandle, kind: K) -> Result<bool, StoreError> {
        self.entity(entity)?
            .slot(&kind)
            .map(|slot| slot.enabled)
            .ok_or_else(|| StoreError::no_such_component(entity, kind))
    }

    fn read_component(
        &self,
        entity: EntityHandle,
        kind: K,
        out: &mut [u8],
    ) -> Result<(), StoreError> {
        let slot = self
            .entity(entity)?
            .slot(&kind)
            .ok_or_else(|| StoreError::no_such_component(entity, kind))?;
        if slot.data.len() != out.len() {
            return Err(StoreError::PayloadSize {
                kind: format!("{:?}", kind),
                expected: out.len(),
                actual: slot.data.len(),
            });
        }
        out.copy_from_slice(&slot.data);
        Ok(())
    }

    fn write_component(
        &mut self,
        entity: EntityHandle,
        kind: K,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let slot = self
            .entity_mut(entity)?
            .slot_mut(&kind)
            .ok_or_else(|| StoreError::no_such_component(entity, kind))?;
        slot.data.clear();
        slot.data.extend_from_slice(data);
        Ok(())
    }

    fn create_entity(&mut self, kinds: &[K]) -> Result<EntityHandle, StoreError> {
        let handle = self.spawn();
        self.add_components(handle, kinds)?;
        Ok(handle)
    }

    fn add_components(&mut self, entity: EntityHandle, kinds: &[K]) -> Result<(), StoreError> {
        let stored = self.entity_mut(entity)?;
        for kind in kinds {
            if stored.slot(kind).is_none() {
                stored.components.push((*kind, ComponentSlot::empty()));
            }
        }
        Ok(())
    }

    fn remove_components(&mut self, entity: EntityHandle, kinds: &[K]) -> Result<(), StoreError> {
        self.entity_mut(entity)?
            .components
            .retain(|(kind, _)| !kinds.contains(kind));
        Ok(())
    }

    fn set_enabled(
        &mut self,
        entity: EntityHandle,
        kind: K,
        enabled: bool,
    ) -> Result<(), StoreError> {
        if self.toggle(entity, kind, enabled) {
            Ok(())
        } else {
            Err(StoreError::no_such_component(entity, kind))
        }
    }

    fn destroy_entities(&mut self, entities: &[EntityHandle]) -> Result<(), StoreError> {
        for handle in entities {
            if !self.despawn(*handle) {
                log::debug!("entity {:?} already gone before destroy", handle);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_insert_get() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        assert!(world.insert(entity, 'a', &[1, 2, 3]));
        assert_eq!(world.get(entity, 'a'), Some(&[1u8, 2, 3][..]));
        assert!(world.slot(entity, 'a').unwrap().enabled);
        assert_eq!(world.get(entity, 'b'), None);
        assert!(!world.insert(EntityHandle(99), 'a', &[0]));
    }

    #[test]
    fn store_batches() {
        let mut world = MemoryWorld::new();
        let entity = world.create_entity(&['a', 'b', 'c']).unwrap();

        let mut kinds = Vec::new();
        world.component_kinds(entity, &mut kinds).unwrap();
        assert_eq!(kinds, vec!['a', 'b', 'c']);

        world.remove_components(entity, &['a', 'c']).unwrap();
        world.add_components(entity, &['b', 'd']).unwrap();
        kinds.clear();
        world.component_kinds(entity, &mut kinds).unwrap();
        assert_eq!(kinds, vec!['b', 'd']);
    }

    #[test]
    fn payload_size_is_checked_on_read() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        world.insert(entity, 'a', &[1, 2]);

        let mut out = [0u8; 3];
        assert!(matches!(
            world.read_component(entity, 'a', &mut out),
            Err(StoreError::PayloadSize { expected: 3, actual: 2, .. })
        ));
        let mut out = [0u8; 2];
        world.read_component(entity, 'a', &mut out).unwrap();
        assert_eq!(out, [1, 2]);
    }

    #[test]
    fn enable_toggle() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        world.insert(entity, 'a', &[]);
        world.set_enabled(entity, 'a', false).unwrap();
        assert!(!world.is_enabled(entity, 'a').unwrap());
        assert!(world.set_enabled(entity, 'z', false).is_err());
    }

    #[test]
    fn destroy_ignores_missing_entities() {
        let mut world: MemoryWorld<char> = MemoryWorld::new();
        let first = world.spawn();
        let second = world.spawn();
        world.destroy_entities(&[first, EntityHandle(77)]).unwrap();

        assert!(!world.contains_entity(first));
        assert!(world.contains_entity(second));
        assert_eq!(world.handles(), vec![second]);
        assert!(matches!(
            world.component_kinds(first, &mut Vec::new()),
            Err(StoreError::NoSuchEntity(_))
        ));
    }
}
