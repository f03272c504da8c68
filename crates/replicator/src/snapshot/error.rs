use crate::ids::IdError;
use crate::store::StoreError;
use crate::wire::{NetworkEntityId, OutOfBounds, TypeId};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("need {needed} bytes after {entities_written} entities, {available} left")]
    BufferTooSmall {
        entities_written: usize,
        needed: usize,
        available: usize,
    },
    #[error("{count} entities exceed the snapshot limit of {max}")]
    TooManyEntities { count: usize, max: usize },
    #[error("write past end of buffer: {0}")]
    Overflow(#[from] OutOfBounds),
    #[error(transparent)]
    Ids(#[from] IdError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("entity {entity} lists unknown type id {type_id}")]
    UnknownTypeId {
        entity: NetworkEntityId,
        type_id: TypeId,
    },
    #[error("entity {entity} lists type id {type_id} after {previous}")]
    UnsortedTypeIds {
        entity: NetworkEntityId,
        previous: TypeId,
        type_id: TypeId,
    },
    #[error("snapshot truncated: {0}")]
    Truncated(#[from] OutOfBounds),
    #[error("snapshot holds more than {max} entities")]
    TooManyEntities { max: usize },
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}
