//! Table of replicated component types.
//!
//! Both ends of a session must build their registry from the same
//! descriptor table: payload sizes are never sent on the wire, they are
//! looked up here by [`TypeId`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use bitflags::bitflags;

use crate::wire::TypeId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentFlags: u8 {
        /// The component can be switched off without being detached.
        const ENABLEABLE = 1 << 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor<K> {
    pub type_id: TypeId,
    pub kind: K,
    pub size: usize,
    pub flags: ComponentFlags,
}

impl<K> ComponentDescriptor<K> {
    pub fn new(type_id: u8, kind: K, size: usize) -> Self {
        Self {
            type_id: TypeId(type_id),
            kind,
            size,
            flags: ComponentFlags::empty(),
        }
    }

    pub fn enableable(mut self) -> Self {
        self.flags |= ComponentFlags::ENABLEABLE;
        self
    }

    #[inline]
    pub fn is_enableable(&self) -> bool {
        self.flags.contains(ComponentFlags::ENABLEABLE)
    }
}

/// Store-independent view of one registry row, comparable across ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaEntry {
    pub type_id: TypeId,
    pub size: usize,
    pub enableable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("expected type id {expected}, found {found}")]
    OutOfOrder { expected: TypeId, found: TypeId },
    #[error("type id FF is reserved as the type list terminator")]
    ReservedTypeId,
    #[error("component kind registered under both {first} and {second}")]
    DuplicateKind { first: TypeId, second: TypeId },
}

#[derive(Debug, Clone)]
pub struct TypeRegistry<K> {
    descriptors: Vec<ComponentDescriptor<K>>,
    by_kind: HashMap<K, TypeId>,
}

impl<K> TypeRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(descriptors: Vec<ComponentDescriptor<K>>) -> Result<Self, RegistryError> {
        let mut by_kind = HashMap::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.type_id.is_end() {
                return Err(RegistryError::ReservedTypeId);
            }
            let expected = match u8::try_from(index) {
                Ok(value) if value != TypeId::END.0 => TypeId(value),
                _ => return Err(RegistryError::ReservedTypeId),
            };
            if descriptor.type_id != expected {
                return Err(RegistryError::OutOfOrder {
                    expected,
                    found: descriptor.type_id,
                });
            }
            if let Some(first) = by_kind.insert(descriptor.kind, descriptor.type_id) {
                return Err(RegistryError::DuplicateKind {
                    first,
                    second: descriptor.type_id,
                });
            }
        }

        Ok(Self {
            descriptors,
            by_kind,
        })
    }

    /// Assigns type ids in iteration order, starting at zero.
    pub fn with_components(
        components: impl IntoIterator<Item = (K, usize, ComponentFlags)>,
    ) -> Result<Self, RegistryError> {
        let mut descriptors = Vec::new();
        for (index, (kind, size, flags)) in components.into_iter().enumerate() {
            let Ok(type_id) = u8::try_from(index) else {
                return Err(RegistryError::ReservedTypeId);
            };
            descriptors.push(ComponentDescriptor {
                type_id: TypeId(type_id),
                kind,
                size,
                flags,
            });
        }
        Self::new(descriptors)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[inline]
    pub fn descriptor(&self, type_id: TypeId) -> Option<&ComponentDescriptor<K>> {
        self.descriptors.get(type_id.index())
    }

    #[inline]
    pub fn type_id_of(&self, kind: K) -> Option<TypeId> {
        self.by_kind.get(&kind).copied()
    }

    pub fn descriptor_of(&self, kind: K) -> Option<&ComponentDescriptor<K>> {
        let type_id = self.type_id_of(kind)?;
        self.descriptor(type_id)
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor<K>] {
        &self.descriptors
    }

    pub fn schema(&self) -> impl Iterator<Item = SchemaEntry> + '_ {
        self.descriptors.iter().map(|d| SchemaEntry {
            type_id: d.type_id,
            size: d.size,
            enableable: d.is_enableable(),
        })
    }

    /// True when `other` assigns the same sizes and flags to the same ids,
    /// whatever component kinds each side uses locally.
    pub fn is_compatible_with<O>(&self, other: &TypeRegistry<O>) -> bool
    where
        O: Copy + Eq + Hash + Debug,
    {
        self.len() == other.len() && self.schema().eq(other.schema())
    }
}
