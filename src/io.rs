//! Little-endian primitive reads from an in-memory byte cursor.
//!
//! The cursor is purely sequential — it never seeks — and tracks the
//! number of bytes consumed from the start of the stream so that errors
//! can report the offset at which they occurred.

use crate::error::DecodeError;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// A sequential little-endian reader over a borrowed byte slice.
pub struct Cursor<'d> {
    data: &'d [u8],
    position: usize,
}

impl<'d> Cursor<'d> {
    pub fn new(data: &'d [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total bytes consumed since the start of the stream.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn take(&mut self, count: usize) -> Result<&'d [u8]> {
        if self.remaining() < count {
            return Err(DecodeError::UnexpectedEnd {
                offset: self.position,
                wanted: count,
            });
        }

        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(array))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads a 32-bit 16.16 fixed-point number, returned as a `f64`.
    pub fn read_fixed(&mut self) -> Result<f64> {
        let raw = self.read_i32()?;
        Ok(f64::from(raw) / 65536.0)
    }

    pub fn read_uuid(&mut self) -> Result<[u8; 16]> {
        let bytes = self.take(16)?;
        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(bytes);
        Ok(uuid)
    }

    /// Reads a 16-bit length-prefixed, UTF-8 validated string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 {
            offset: self.position - len,
        })
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'d [u8]> {
        self.take(count)
    }

    /// Reads `count` raw bytes into an owned `Vec`.
    pub fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::Cursor;

    #[test]
    fn reads_little_endian_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut cursor = Cursor::new(&data);

        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16().unwrap(), 0x0403);
        assert_eq!(cursor.read_i32().unwrap(), -1);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn reads_length_prefixed_string() {
        let data = [0x05, 0x00, b'h', b'e', b'l', b'l', b'o'];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "hello");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let data = [0x01, 0x00, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.read_string().is_err());
    }

    #[test]
    fn fails_on_short_read_without_advancing_improperly() {
        let data = [0x00];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.read_u32().is_err());
    }

    #[test]
    fn reads_fixed_point() {
        let data = (1_i32 << 16).to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_fixed().unwrap(), 1.0);
    }
}
