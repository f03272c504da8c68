mod cursor;

use std::fmt;

pub use cursor::{OutOfBounds, ReadCursor, WriteCursor};

pub const NETWORK_ID_LEN: usize = 2;
pub const TYPE_LIST_END_LEN: usize = 1;
pub const END_MARKER_LEN: usize = NETWORK_ID_LEN;

/// One-byte identifier of a replicated component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u8);

impl TypeId {
    /// Terminates the type id list of an entity record.
    pub const END: TypeId = TypeId(0xFF);

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_end(self) -> bool {
        self == Self::END
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Entity identifier scoped to one replication session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkEntityId(pub u16);

impl NetworkEntityId {
    /// Terminates the entity list of a snapshot.
    pub const END: NetworkEntityId = NetworkEntityId(0xFFFF);

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn is_end(self) -> bool {
        self == Self::END
    }

    pub fn to_bytes(self) -> [u8; NETWORK_ID_LEN] {
        self.0.to_le_bytes()
    }

    pub fn from_bytes(bytes: [u8; NETWORK_ID_LEN]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl fmt::Display for NetworkEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Formats a type id slice as comma separated hex, e.g. `1,3,1F`.
pub struct TypeIdList<'a>(pub &'a [TypeId]);

impl fmt::Display for TypeIdList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, type_id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", type_id)?;
        }
        Ok(())
    }
}

/// Size of one encoded entity record with `type_count` ids and
/// `payload_len` bytes of component data.
pub fn record_len(type_count: usize, payload_len: usize) -> usize {
    NETWORK_ID_LEN + type_count + TYPE_LIST_END_LEN + payload_len
}
