//! `0x2016` mask chunk (deprecated, kept for completeness).

use crate::io::{Cursor, Result};

#[derive(Debug, Clone)]
pub struct MaskChunk {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub name: String,
    /// 1 bit per pixel, row-major, each row padded to a byte boundary.
    pub bitmap: Vec<u8>,
}

impl MaskChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let x = cursor.read_i16()?;
        let y = cursor.read_i16()?;
        let width = cursor.read_u16()?;
        let height = cursor.read_u16()?;
        cursor.skip(8)?; // reserved
        let name = cursor.read_string()?;

        let row_bytes = (width as usize + 7) / 8;
        let bitmap = cursor.read_vec(row_bytes * height as usize)?;

        Ok(MaskChunk {
            x,
            y,
            width,
            height,
            name,
            bitmap,
        })
    }
}
