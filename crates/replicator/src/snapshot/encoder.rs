use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::config::ReplicationConfig;
use crate::ids::SendEntityMap;
use crate::registry::TypeRegistry;
use crate::store::ComponentStore;
use crate::wire::{END_MARKER_LEN, NetworkEntityId, TypeId, WriteCursor, record_len};

use super::error::EncodeError;

/// Replicated component of one entity, in wire order once sorted.
#[derive(Debug, Clone, Copy)]
struct Outgoing<K> {
    type_id: TypeId,
    kind: K,
    size: usize,
}

/// Sending half of a replication session.
///
/// Owns the network id assignments for the session; feed it the same
/// store across passes so entities keep their ids.
#[derive(Debug)]
pub struct SnapshotEncoder<E, K> {
    registry: Arc<TypeRegistry<K>>,
    config: ReplicationConfig,
    ids: SendEntityMap<E>,
    kinds: Vec<K>,
    outgoing: Vec<Outgoing<K>>,
}

impl<E, K> SnapshotEncoder<E, K>
where
    E: Copy + Eq + Hash + Debug,
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(registry: Arc<TypeRegistry<K>>) -> Self {
        Self::with_config(registry, ReplicationConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry<K>>, config: ReplicationConfig) -> Self {
        Self {
            registry,
            config,
            ids: SendEntityMap::new(),
            kinds: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry<K> {
        &self.registry
    }

    pub fn entities(&self) -> &SendEntityMap<E> {
        &self.ids
    }

    /// Writes a full snapshot of `entities` into `buf`, returning the number
    /// of bytes written.
    ///
    /// Each record is bounds checked as a whole before any of it is written,
    /// together with room for the end marker.
    pub fn encode<S>(
        &mut self,
        store: &S,
        entities: &[E],
        buf: &mut [u8],
    ) -> Result<usize, EncodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        self.check_entity_count(entities.len())?;

        let mut cursor = WriteCursor::new(buf);

        for (index, &entity) in entities.iter().enumerate() {
            let payload_len = gather(
                &self.registry,
                store,
                entity,
                &mut self.kinds,
                &mut self.outgoing,
            )?;

            let needed = record_len(self.outgoing.len(), payload_len) + END_MARKER_LEN;
            if cursor.remaining() < needed {
                log::debug!(
                    "snapshot buffer full after {} of {} entities ({} bytes)",
                    index,
                    entities.len(),
                    cursor.position()
                );
                return Err(EncodeError::BufferTooSmall {
                    entities_written: index,
                    needed,
                    available: cursor.remaining(),
                });
            }

            let network_id = self.ids.resolve(entity)?;
            cursor.write_network_id(network_id)?;
            for component in &self.outgoing {
                cursor.write_type_id(component.type_id)?;
            }
            cursor.write_type_id(TypeId::END)?;

            for component in &self.outgoing {
                let slot = cursor.reserve(component.size)?;
                store.read_component(entity, component.kind, slot)?;
            }

            log::trace!(
                "entity {:?} as {}: {} components, {} payload bytes",
                entity,
                network_id,
                self.outgoing.len(),
                payload_len
            );
        }

        cursor.write_network_id(NetworkEntityId::END)?;

        log::debug!(
            "encoded {} entities into {} bytes",
            entities.len(),
            cursor.position()
        );
        Ok(cursor.position())
    }

    /// Bytes `encode` would need for `entities` in the store's current state.
    /// Does not assign network ids.
    pub fn encoded_len<S>(&mut self, store: &S, entities: &[E]) -> Result<usize, EncodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        let mut total = END_MARKER_LEN;
        for &entity in entities {
            let payload_len = gather(
                &self.registry,
                store,
                entity,
                &mut self.kinds,
                &mut self.outgoing,
            )?;
            total += record_len(self.outgoing.len(), payload_len);
        }
        Ok(total)
    }

    /// Convenience over [`encode`](Self::encode) that sizes the buffer first.
    pub fn encode_to_vec<S>(&mut self, store: &S, entities: &[E]) -> Result<Vec<u8>, EncodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        let mut buf = vec![0u8; self.encoded_len(store, entities)?];
        let written = self.encode(store, entities, &mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    fn check_entity_count(&self, count: usize) -> Result<(), EncodeError> {
        if count > self.config.max_entities {
            return Err(EncodeError::TooManyEntities {
                count,
                max: self.config.max_entities,
            });
        }
        Ok(())
    }
}

/// Collects the entity's replicated components, sorted by type id, and
/// returns their total payload size. Disabled enableable components and
/// kinds outside the registry are left out.
fn gather<S, E, K>(
    registry: &TypeRegistry<K>,
    store: &S,
    entity: E,
    kinds: &mut Vec<K>,
    outgoing: &mut Vec<Outgoing<K>>,
) -> Result<usize, EncodeError>
where
    S: ComponentStore<Entity = E, Kind = K>,
    E: Copy + Eq + Hash + Debug,
    K: Copy + Eq + Hash + Debug,
{
    kinds.clear();
    outgoing.clear();
    store.component_kinds(entity, kinds)?;

    for &kind in kinds.iter() {
        let Some(descriptor) = registry.descriptor_of(kind) else {
            log::trace!("skipping unreplicated component {:?}", kind);
            continue;
        };
        if descriptor.is_enableable() && !store.is_enabled(entity, kind)? {
            continue;
        }
        outgoing.push(Outgoing {
            type_id: descriptor.type_id,
            kind,
            size: descriptor.size,
        });
    }

    outgoing.sort_unstable_by_key(|component| component.type_id);
    Ok(outgoing.iter().map(|component| component.size).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdError;
    use crate::registry::ComponentDescriptor;
    use crate::store::{EntityHandle, MemoryWorld};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Tag,
        Health,
        Armor,
        Name,
        Ammo,
        Stunned,
        Local,
    }

    fn registry() -> Arc<TypeRegistry<Kind>> {
        Arc::new(
            TypeRegistry::new(vec![
                ComponentDescriptor::new(0, Kind::Tag, 0),
                ComponentDescriptor::new(1, Kind::Health, 4),
                ComponentDescriptor::new(2, Kind::Armor, 2),
                ComponentDescriptor::new(3, Kind::Name, 8),
                ComponentDescriptor::new(4, Kind::Ammo, 1),
                ComponentDescriptor::new(5, Kind::Stunned, 1).enableable(),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn disabled_component_is_left_out() {
        let mut world = MemoryWorld::new();
        let mut entity = world.spawn();
        while entity != EntityHandle(7) {
            world.despawn(entity);
            entity = world.spawn();
        }
        world.insert(entity, Kind::Stunned, &[9]);
        world.insert(entity, Kind::Armor, &[0x34, 0x12]);
        world.toggle(entity, Kind::Stunned, false);

        let mut encoder = SnapshotEncoder::new(registry());
        let mut buf = [0u8; 32];
        let written = encoder.encode(&world, &[entity], &mut buf).unwrap();

        assert_eq!(
            &buf[..written],
            &[0x00, 0x00, 2, 0xFF, 0x34, 0x12, 0xFF, 0xFF]
        );
        assert_eq!(encoder.entities().get(entity), Some(NetworkEntityId(0)));
    }

    #[test]
    fn sorted_ids_and_payload_order() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        world.insert(entity, Kind::Ammo, &[5]);
        world.insert(entity, Kind::Local, &[1, 1, 1]);
        world.insert(entity, Kind::Health, &[1, 2, 3, 4]);
        world.insert(entity, Kind::Tag, &[]);
        world.insert(entity, Kind::Stunned, &[7]);

        let mut encoder = SnapshotEncoder::new(registry());
        let bytes = encoder.encode_to_vec(&world, &[entity]).unwrap();

        assert_eq!(
            bytes,
            vec![0x00, 0x00, 0, 1, 4, 5, 0xFF, 1, 2, 3, 4, 5, 7, 0xFF, 0xFF]
        );
    }

    #[test]
    fn ids_are_stable_across_passes() {
        let mut world = MemoryWorld::new();
        let first = world.spawn();
        let second = world.spawn();

        let mut encoder = SnapshotEncoder::new(registry());
        let bytes = encoder.encode_to_vec(&world, &[second, first]).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0xFF, 0x01, 0x00, 0xFF, 0xFF, 0xFF]);

        let bytes = encoder.encode_to_vec(&world, &[first]).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn empty_snapshot_is_just_the_marker() {
        let world: MemoryWorld<Kind> = MemoryWorld::new();
        let mut encoder = SnapshotEncoder::new(registry());
        let mut buf = [0u8; 2];
        assert_eq!(encoder.encode(&world, &[], &mut buf).unwrap(), 2);
        assert_eq!(buf, [0xFF, 0xFF]);
    }

    #[test]
    fn buffer_too_small_stops_at_entity_boundary() {
        let mut world = MemoryWorld::new();
        let first = world.spawn();
        world.insert(first, Kind::Health, &[1, 0, 0, 0]);
        let second = world.spawn();
        world.insert(second, Kind::Name, &[b'x'; 8]);

        let mut encoder = SnapshotEncoder::new(registry());
        let mut buf = [0u8; 16];
        let err = encoder
            .encode(&world, &[first, second], &mut buf)
            .unwrap_err();

        match err {
            EncodeError::BufferTooSmall {
                entities_written,
                needed,
                available,
            } => {
                assert_eq!(entities_written, 1);
                assert_eq!(needed, 2 + 1 + 1 + 8 + 2);
                assert_eq!(available, 16 - 8);
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(&buf[8..], &[0u8; 8]);
        assert_eq!(encoder.entities().get(second), None);
    }

    #[test]
    fn encoded_len_matches_output() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        world.insert(entity, Kind::Health, &[1, 0, 0, 0]);
        world.insert(entity, Kind::Ammo, &[3]);

        let mut encoder = SnapshotEncoder::new(registry());
        let len = encoder.encoded_len(&world, &[entity]).unwrap();
        assert!(encoder.entities().is_empty());
        assert_eq!(encoder.encode_to_vec(&world, &[entity]).unwrap().len(), len);
    }

    #[test]
    fn wrong_payload_size_is_a_store_error() {
        let mut world = MemoryWorld::new();
        let entity = world.spawn();
        world.insert(entity, Kind::Health, &[1, 2]);

        let mut encoder = SnapshotEncoder::new(registry());
        assert!(matches!(
            encoder.encode_to_vec(&world, &[entity]),
            Err(EncodeError::Store(_))
        ));
    }

    #[test]
    fn entity_limit() {
        let world: MemoryWorld<Kind> = MemoryWorld::new();
        let config = ReplicationConfig { max_entities: 1 };
        let mut encoder = SnapshotEncoder::with_config(registry(), config);
        let mut buf = [0u8; 64];
        assert!(matches!(
            encoder.encode(&world, &[EntityHandle(1), EntityHandle(2)], &mut buf),
            Err(EncodeError::TooManyEntities { count: 2, max: 1 })
        ));
    }

    #[test]
    fn exhausted_ids_fail_the_encode() {
        let mut world: MemoryWorld<Kind> = MemoryWorld::new();
        let entities: Vec<EntityHandle> = (0..0xFFFF).map(|_| world.spawn()).collect();

        let mut encoder = SnapshotEncoder::new(registry());
        let bytes = encoder.encode_to_vec(&world, &entities).unwrap();
        assert_eq!(bytes.len(), 0xFFFF * 3 + 2);
        assert_eq!(encoder.entities().next_id(), NetworkEntityId::END);

        let late = world.spawn();
        let err = encoder.encode_to_vec(&world, &[late]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Ids(IdError::NetworkIdsExhausted(0xFFFF))
        ));
        assert_eq!(encoder.entities().get(late), None);

        let known = encoder.encode_to_vec(&world, &entities[..1]).unwrap();
        assert_eq!(known, vec![0x00, 0x00, 0xFF, 0xFF, 0xFF]);
    }
}
