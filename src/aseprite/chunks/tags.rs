//! `0x2018` tags chunk.

use crate::io::{Cursor, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoopDirection {
    Forward,
    Reverse,
    PingPong,
    PingPongReverse,
}

impl LoopDirection {
    /// Any byte value this reader hasn't been told about maps to
    /// `Forward`, matching the permissive handling the rest of the
    /// decoder gives to unrecognized enumerations that don't carry
    /// their own length-prefixed escape hatch.
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoopDirection::Reverse,
            2 => LoopDirection::PingPong,
            3 => LoopDirection::PingPongReverse,
            _ => LoopDirection::Forward,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub from_frame: u16,
    pub to_frame: u16,
    pub direction: LoopDirection,
    /// `0` means loop forever.
    pub repeat_count: u16,
    pub name: String,
}

impl Tag {
    pub fn loops_forever(&self) -> bool {
        self.repeat_count == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagsChunk {
    pub tags: Vec<Tag>,
}

impl TagsChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let count = cursor.read_u16()?;
        cursor.skip(8)?; // reserved

        let mut tags = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let from_frame = cursor.read_u16()?;
            let to_frame = cursor.read_u16()?;
            let direction = LoopDirection::from_u8(cursor.read_u8()?);
            let repeat_count = cursor.read_u16()?;
            cursor.skip(6)?; // reserved
            cursor.skip(3)?; // deprecated tag color (RGB)
            cursor.skip(1)?; // reserved
            let name = cursor.read_string()?;

            tags.push(Tag {
                from_frame,
                to_frame,
                direction,
                repeat_count,
                name,
            });
        }

        Ok(TagsChunk { tags })
    }
}
