//! `0x2007` color profile chunk.

use crate::io::{Cursor, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColorProfileType {
    None,
    Srgb,
    IccEmbedded,
}

impl ColorProfileType {
    fn from_u16(value: u16) -> Self {
        match value {
            1 => ColorProfileType::Srgb,
            2 => ColorProfileType::IccEmbedded,
            _ => ColorProfileType::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorProfileChunk {
    pub profile_type: ColorProfileType,
    pub use_fixed_gamma: bool,
    pub gamma: f64,
    pub icc_data: Vec<u8>,
}

impl ColorProfileChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let profile_type = ColorProfileType::from_u16(cursor.read_u16()?);
        let flags = cursor.read_u16()?;
        let gamma = cursor.read_fixed()?;
        cursor.skip(8)?; // reserved

        let icc_data = if profile_type == ColorProfileType::IccEmbedded {
            let length = cursor.read_u32()? as usize;
            cursor.read_vec(length)?
        } else {
            Vec::new()
        };

        Ok(ColorProfileChunk {
            profile_type,
            use_fixed_gamma: flags & 0x0001 != 0,
            gamma,
            icc_data,
        })
    }
}
