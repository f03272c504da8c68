use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::config::ReplicationConfig;
use crate::ids::ReceiveEntityMap;
use crate::registry::TypeRegistry;
use crate::store::ComponentStore;
use crate::wire::{NetworkEntityId, OutOfBounds, ReadCursor, TypeId, TypeIdList};

use super::diff::TypeIdDiff;
use super::error::DecodeError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub bytes_read: usize,
}

#[derive(Debug, Clone, Copy)]
struct Incoming<K> {
    kind: K,
    size: usize,
    enableable: bool,
}

/// Receiving half of a replication session.
///
/// Mirrors the sender's entities into a local store: every `decode` pass
/// reshapes known entities to the received component sets, creates new
/// ones and destroys those the snapshot no longer mentions.
#[derive(Debug)]
pub struct SnapshotDecoder<E, K> {
    registry: Arc<TypeRegistry<K>>,
    config: ReplicationConfig,
    ids: ReceiveEntityMap<E>,
    received_ids: Vec<TypeId>,
    received: Vec<Incoming<K>>,
    local_kinds: Vec<K>,
    local_ids: Vec<TypeId>,
    diff: TypeIdDiff,
    batch: Vec<K>,
    doomed: Vec<E>,
}

impl<E, K> SnapshotDecoder<E, K>
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
            ids: ReceiveEntityMap::new(),
            received_ids: Vec::new(),
            received: Vec::new(),
            local_kinds: Vec::new(),
            local_ids: Vec::new(),
            diff: TypeIdDiff::new(),
            batch: Vec::new(),
            doomed: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry<K> {
        &self.registry
    }

    pub fn entities(&self) -> &ReceiveEntityMap<E> {
        &self.ids
    }

    /// Applies one full snapshot to `store`.
    ///
    /// Any error aborts the pass part way through; entities already
    /// processed keep their new state and nothing is swept. Recover by
    /// decoding a fresh snapshot.
    pub fn decode<S>(&mut self, store: &mut S, bytes: &[u8]) -> Result<DecodeSummary, DecodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        let generation = self.ids.begin_pass();
        let mut cursor = ReadCursor::new(bytes);
        let mut summary = DecodeSummary::default();
        let mut records = 0usize;

        loop {
            let network_id = cursor.read_network_id()?;
            if network_id.is_end() {
                break;
            }
            records += 1;
            if records > self.config.max_entities {
                return Err(DecodeError::TooManyEntities {
                    max: self.config.max_entities,
                });
            }

            let payload_len = self.read_type_ids(&mut cursor, network_id)?;
            if cursor.remaining() < payload_len {
                return Err(DecodeError::Truncated(OutOfBounds {
                    offset: cursor.position(),
                    needed: payload_len,
                    available: cursor.remaining(),
                }));
            }

            let entity = match self.ids.resolve(network_id) {
                Some(entity) if store.contains_entity(entity) => {
                    self.reconcile(store, entity)?;
                    self.ids.touch(network_id);
                    summary.updated += 1;
                    entity
                }
                vanished => {
                    if let Some(entity) = vanished {
                        log::debug!(
                            "{:?} for network entity {} left the store, recreating",
                            entity,
                            network_id
                        );
                    }
                    let entity = self.spawn(store)?;
                    self.ids.insert(network_id, entity);
                    log::trace!("created {:?} for network entity {}", entity, network_id);
                    summary.created += 1;
                    entity
                }
            };

            for component in &self.received {
                let data = cursor.read_bytes(component.size)?;
                store.write_component(entity, component.kind, data)?;
            }
        }

        // Mappings go only once the store has let go of their entities.
        let stale = self.ids.stale();
        if !stale.is_empty() {
            self.doomed.clear();
            self.doomed.extend(stale.iter().map(|(_, entity)| *entity));
            log::debug!(
                "destroying {} entities missing from generation {}",
                self.doomed.len(),
                generation
            );
            store.destroy_entities(&self.doomed)?;
            self.ids.sweep();
        }

        summary.destroyed = stale.len();
        summary.bytes_read = cursor.position();

        log::debug!(
            "decoded generation {}: {} created, {} updated, {} destroyed, {} bytes",
            generation,
            summary.created,
            summary.updated,
            summary.destroyed,
            summary.bytes_read
        );
        Ok(summary)
    }

    /// Destroys every mirrored entity and forgets all network ids, so the
    /// next snapshot rebuilds the mirror from scratch.
    pub fn reset<S>(&mut self, store: &mut S) -> Result<usize, DecodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        self.doomed.clear();
        self.doomed.extend(self.ids.iter().map(|(_, e)| e));
        store.destroy_entities(&self.doomed)?;
        self.ids.clear();

        log::debug!("reset dropped {} mirrored entities", self.doomed.len());
        Ok(self.doomed.len())
    }

    /// Reads one type id list and returns the payload size it announces.
    fn read_type_ids(
        &mut self,
        cursor: &mut ReadCursor<'_>,
        network_id: NetworkEntityId,
    ) -> Result<usize, DecodeError> {
        self.received_ids.clear();
        self.received.clear();
        let mut payload_len = 0;

        loop {
            let type_id = cursor.read_type_id()?;
            if type_id.is_end() {
                break;
            }
            let Some(descriptor) = self.registry.descriptor(type_id) else {
                return Err(DecodeError::UnknownTypeId {
                    entity: network_id,
                    type_id,
                });
            };
            if let Some(&previous) = self.received_ids.last() {
                if type_id <= previous {
                    return Err(DecodeError::UnsortedTypeIds {
                        entity: network_id,
                        previous,
                        type_id,
                    });
                }
            }

            self.received_ids.push(type_id);
            self.received.push(Incoming {
                kind: descriptor.kind,
                size: descriptor.size,
                enableable: descriptor.is_enableable(),
            });
            payload_len += descriptor.size;
        }

        log::trace!(
            "network entity {} lists [{}]",
            network_id,
            TypeIdList(&self.received_ids)
        );
        Ok(payload_len)
    }

    fn spawn<S>(&mut self, store: &mut S) -> Result<E, DecodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        self.batch.clear();
        self.batch.extend(self.received.iter().map(|c| c.kind));
        let entity = store.create_entity(&self.batch)?;

        for component in self.received.iter().filter(|c| c.enableable) {
            store.set_enabled(entity, component.kind, true)?;
        }
        Ok(entity)
    }

    /// Reshapes a known entity to the received type id set.
    fn reconcile<S>(&mut self, store: &mut S, entity: E) -> Result<(), DecodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        self.local_kinds.clear();
        store.component_kinds(entity, &mut self.local_kinds)?;

        self.local_ids.clear();
        for kind in &self.local_kinds {
            if let Some(type_id) = self.registry.type_id_of(*kind) {
                self.local_ids.push(type_id);
            }
        }
        self.local_ids.sort_unstable();

        self.diff.compute(&self.local_ids, &self.received_ids);
        if self.diff.is_unchanged() {
            return self.enable_all(store, entity);
        }

        // Enableable components are switched off instead of detached.
        self.batch.clear();
        for type_id in &self.diff.removed {
            let Some(descriptor) = self.registry.descriptor(*type_id) else {
                continue;
            };
            if descriptor.is_enableable() {
                store.set_enabled(entity, descriptor.kind, false)?;
            } else {
                self.batch.push(descriptor.kind);
            }
        }
        if !self.batch.is_empty() {
            store.remove_components(entity, &self.batch)?;
        }

        self.batch.clear();
        for type_id in &self.diff.added {
            if let Some(descriptor) = self.registry.descriptor(*type_id) {
                self.batch.push(descriptor.kind);
            }
        }
        if !self.batch.is_empty() {
            store.add_components(entity, &self.batch)?;
        }

        self.enable_all(store, entity)
    }

    /// Switches on every enableable component of the received set, which
    /// covers both freshly added ones and ones disabled by an earlier pass.
    fn enable_all<S>(&self, store: &mut S, entity: E) -> Result<(), DecodeError>
    where
        S: ComponentStore<Entity = E, Kind = K>,
    {
        for component in self.received.iter().filter(|c| c.enableable) {
            store.set_enabled(entity, component.kind, true)?;
        }
        Ok(())
    }
}
