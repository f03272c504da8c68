//! Capability interface into the host entity-component store.

mod world;

use std::fmt::Debug;
use std::hash::Hash;

pub use world::{ComponentSlot, EntityHandle, MemoryWorld};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {0} does not exist")]
    NoSuchEntity(String),
    #[error("entity {entity} has no component {kind}")]
    NoSuchComponent { entity: String, kind: String },
    #[error("component {kind} holds {actual} bytes, expected {expected}")]
    PayloadSize {
        kind: String,
        expected: usize,
        actual: usize,
    },
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn no_such_entity(entity: impl Debug) -> Self {
        Self::NoSuchEntity(format!("{:?}", entity))
    }

    pub fn no_such_component(entity: impl Debug, kind: impl Debug) -> Self {
        Self::NoSuchComponent {
            entity: format!("{:?}", entity),
            kind: format!("{:?}", kind),
        }
    }
}

/// What the codec needs from an entity-component store.
///
/// `Kind` is the store's own component type identifier; the
/// [`TypeRegistry`](crate::registry::TypeRegistry) maps it to a wire
/// [`TypeId`](crate::wire::TypeId). Kinds the registry does not know are
/// never replicated.
pub trait ComponentStore {
    type Entity: Copy + Eq + Hash + Debug;
    type Kind: Copy + Eq + Hash + Debug;

    fn contains_entity(&self, entity: Self::Entity) -> bool;

    /// Appends every component kind attached to `entity`, enabled or not.
    fn component_kinds(
        &self,
        entity: Self::Entity,
        out: &mut Vec<Self::Kind>,
    ) -> Result<(), StoreError>;

    fn is_enabled(&self, entity: Self::Entity, kind: Self::Kind) -> Result<bool, StoreError>;

    /// Fills `out` with the component's fixed-size binary payload.
    fn read_component(
        &self,
        entity: Self::Entity,
        kind: Self::Kind,
        out: &mut [u8],
    ) -> Result<(), StoreError>;

    fn write_component(
        &mut self,
        entity: Self::Entity,
        kind: Self::Kind,
        data: &[u8],
    ) -> Result<(), StoreError>;

    fn create_entity(&mut self, kinds: &[Self::Kind]) -> Result<Self::Entity, StoreError>;

    fn add_components(
        &mut self,
        entity: Self::Entity,
        kinds: &[Self::Kind],
    ) -> Result<(), StoreError>;

    fn remove_components(
        &mut self,
        entity: Self::Entity,
        kinds: &[Self::Kind],
    ) -> Result<(), StoreError>;

    /// Only called for kinds registered as enableable.
    fn set_enabled(
        &mut self,
        entity: Self::Entity,
        kind: Self::Kind,
        enabled: bool,
    ) -> Result<(), StoreError>;

    /// Entities that are already gone are skipped.
    fn destroy_entities(&mut self, entities: &[Self::Entity]) -> Result<(), StoreError>;
}
