//! Full-state replication of an entity-component store.
//!
//! A [`SnapshotEncoder`] writes every replicated entity with its sorted
//! component type ids and fixed-size payloads into a caller supplied
//! buffer. A [`SnapshotDecoder`] applies such a snapshot to a local mirror:
//! it diffs component sets, attaches, detaches or toggles components, and
//! destroys entities the snapshot no longer mentions.
//!
//! ```text
//! Snapshot := Entity* 0xFFFF
//! Entity   := NetworkEntityId(u16 LE) TypeId* 0xFF Payload*
//! ```

pub mod config;
pub mod ids;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod wire;

pub use config::{MAX_NETWORK_ENTITIES, ReplicationConfig};
pub use ids::{IdError, ReceiveEntityMap, SendEntityMap};
pub use registry::{ComponentDescriptor, ComponentFlags, RegistryError, SchemaEntry, TypeRegistry};
pub use snapshot::{
    DecodeError, DecodeSummary, EncodeError, SnapshotDecoder, SnapshotEncoder, TypeIdDiff, diff,
};
pub use store::{ComponentSlot, ComponentStore, EntityHandle, MemoryWorld, StoreError};
pub use wire::{NetworkEntityId, TypeId, TypeIdList};
