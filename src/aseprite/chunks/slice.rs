//! `0x2022` slice chunk.

use crate::io::{Cursor, Result};
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    pub struct SliceFlags: u32 {
        const NINE_PATCH    = 0x0001;
        const HAS_PIVOT     = 0x0002;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NinePatch {
    pub center_x: i32,
    pub center_y: i32,
    pub center_width: u32,
    pub center_height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Pivot {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone)]
pub struct SliceKey {
    pub frame: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub nine_patch: Option<NinePatch>,
    pub pivot: Option<Pivot>,
}

#[derive(Debug, Clone)]
pub struct SliceChunk {
    pub flags: SliceFlags,
    pub name: String,
    pub keys: Vec<SliceKey>,
}

impl SliceChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let key_count = cursor.read_u32()?;
        let flags = SliceFlags::from_bits_truncate(cursor.read_u32()?);
        cursor.skip(4)?; // reserved
        let name = cursor.read_string()?;

        let mut keys = Vec::with_capacity(key_count as usize);
        for _ in 0..key_count {
            let frame = cursor.read_u32()?;
            let x = cursor.read_i32()?;
            let y = cursor.read_i32()?;
            let width = cursor.read_u32()?;
            let height = cursor.read_u32()?;

            let nine_patch = if flags.contains(SliceFlags::NINE_PATCH) {
                Some(NinePatch {
                    center_x: cursor.read_i32()?,
                    center_y: cursor.read_i32()?,
                    center_width: cursor.read_u32()?,
                    center_height: cursor.read_u32()?,
                })
            } else {
                None
            };

            let pivot = if flags.contains(SliceFlags::HAS_PIVOT) {
                Some(Pivot {
                    x: cursor.read_i32()?,
                    y: cursor.read_i32()?,
                })
            } else {
                None
            };

            keys.push(SliceKey {
                frame,
                x,
                y,
                width,
                height,
                nine_patch,
                pivot,
            });
        }

        Ok(SliceChunk { flags, name, keys })
    }
}
