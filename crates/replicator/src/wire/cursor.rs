use super::{NETWORK_ID_LEN, NetworkEntityId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("need {needed} bytes at offset {offset}, {available} available")]
pub struct OutOfBounds {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

/// Bounds-checked writer over a caller supplied buffer.
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Hands out the next `len` bytes for the caller to fill.
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8], OutOfBounds> {
        if len > self.remaining() {
            return Err(OutOfBounds {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buf[start..self.pos])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), OutOfBounds> {
        self.write_bytes(&[value])
    }

    pub fn write_type_id(&mut self, type_id: TypeId) -> Result<(), OutOfBounds> {
        self.write_u8(type_id.0)
    }

    pub fn write_network_id(&mut self, id: NetworkEntityId) -> Result<(), OutOfBounds> {
        self.write_bytes(&id.to_bytes())
    }
}

/// Bounds-checked reader over a received snapshot.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], OutOfBounds> {
        if len > self.remaining() {
            return Err(OutOfBounds {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, OutOfBounds> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_type_id(&mut self) -> Result<TypeId, OutOfBounds> {
        self.read_u8().map(TypeId)
    }

    pub fn read_network_id(&mut self) -> Result<NetworkEntityId, OutOfBounds> {
        let bytes = self.read_bytes(NETWORK_ID_LEN)?;
        Ok(NetworkEntityId::from_bytes([bytes[0], bytes[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut buf = [0u8; 8];
        let mut writer = WriteCursor::new(&mut buf);
        writer.write_network_id(NetworkEntityId(7)).unwrap();
        writer.write_type_id(TypeId(2)).unwrap();
        writer.write_type_id(TypeId::END).unwrap();
        writer.reserve(2).unwrap().copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(writer.position(), 6);
        assert_eq!(writer.remaining(), 2);

        let mut reader = ReadCursor::new(&buf[..6]);
        assert_eq!(reader.read_network_id().unwrap(), NetworkEntityId(7));
        assert_eq!(reader.read_type_id().unwrap(), TypeId(2));
        assert!(reader.read_type_id().unwrap().is_end());
        assert_eq!(reader.read_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert!(reader.is_empty());
    }

    #[test]
    fn write_past_end_is_rejected() {
        let mut buf = [0u8; 3];
        let mut writer = WriteCursor::new(&mut buf);
        writer.write_network_id(NetworkEntityId(1)).unwrap();

        let err = writer.write_network_id(NetworkEntityId(2)).unwrap_err();
        assert_eq!(
            err,
            OutOfBounds {
                offset: 2,
                needed: 2,
                available: 1,
            }
        );
        assert_eq!(writer.position(), 2);
    }

    #[test]
    fn read_past_end_is_rejected() {
        let data = [0x01];
        let mut reader = ReadCursor::new(&data);
        assert!(reader.read_network_id().is_err());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert!(reader.read_u8().is_err());
    }
}
