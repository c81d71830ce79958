//! Bounds-checked sequential reader over a borrowed byte slice.
//!
//! Reads are generic over [`byteorder::ByteOrder`], so the same cursor serves
//! little-endian record fields and any big-endian value a caller needs.

use byteorder::ByteOrder;

use crate::{UsnResult, errors::UsnError};

/// Cursor over a byte slice with absolute position tracking.
///
/// The cursor never copies the underlying buffer; every read either returns a
/// value or a borrowed sub-slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Current absolute offset within the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn out_of_bounds(&self, needed: usize) -> UsnError {
        UsnError::OutOfBounds {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    /// Returns the next `n` bytes without advancing.
    pub fn peek_bytes(&self, n: usize) -> UsnResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| self.out_of_bounds(n))?;
        self.data.get(self.pos..end).ok_or_else(|| self.out_of_bounds(n))
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read_bytes(&mut self, n: usize) -> UsnResult<&'a [u8]> {
        let bytes = self.peek_bytes(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Moves to an absolute offset in `[0, len]`.
    pub fn seek(&mut self, offset: usize) -> UsnResult<()> {
        if offset > self.data.len() {
            return Err(UsnError::OutOfBounds {
                offset,
                needed: 0,
                available: 0,
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Advances by `n` bytes.
    pub fn skip(&mut self, n: usize) -> UsnResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u16<E: ByteOrder>(&mut self) -> UsnResult<u16> {
        self.read_bytes(2).map(E::read_u16)
    }

    pub fn read_u32<E: ByteOrder>(&mut self) -> UsnResult<u32> {
        self.read_bytes(4).map(E::read_u32)
    }

    pub fn read_u64<E: ByteOrder>(&mut self) -> UsnResult<u64> {
        self.read_bytes(8).map(E::read_u64)
    }

    pub fn read_i64<E: ByteOrder>(&mut self) -> UsnResult<i64> {
        self.read_bytes(8).map(E::read_i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn reads_advance_by_width() -> UsnResult<()> {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u16::<LittleEndian>()?, 0x0201);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.read_u32::<BigEndian>()?, 0x0304_0506);
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.remaining(), 4);
        assert_eq!(cursor.read_u32::<LittleEndian>()?, 0x0a09_0807);
        assert_eq!(cursor.remaining(), 0);
        Ok(())
    }

    #[test]
    fn read_past_end_reports_position() {
        let data = [0u8; 6];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(4).unwrap();

        let err = cursor.read_u64::<LittleEndian>().unwrap_err();
        assert_eq!(
            err,
            UsnError::OutOfBounds {
                offset: 4,
                needed: 8,
                available: 2
            }
        );
        // A failed read leaves the position untouched.
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn peek_does_not_advance() -> UsnResult<()> {
        let data = [0xaa, 0xbb, 0xcc];
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.peek_bytes(2)?, &[0xaa, 0xbb]);
        assert_eq!(cursor.position(), 0);
        assert!(cursor.peek_bytes(4).is_err());
        Ok(())
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.seek(8).is_ok());
        assert_eq!(cursor.remaining(), 0);
        assert!(matches!(
            cursor.seek(9),
            Err(UsnError::OutOfBounds { offset: 9, .. })
        ));
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn huge_length_does_not_overflow() {
        let data = [0u8; 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();
        assert!(cursor.peek_bytes(usize::MAX).is_err());
    }
}
