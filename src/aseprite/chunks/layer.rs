//! `0x2004` layer chunk.

use crate::io::{Cursor, Result};
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    pub struct LayerFlags: u16 {
        const VISIBLE            = 0x0001;
        const EDITABLE           = 0x0002;
        const LOCK_MOVEMENT      = 0x0004;
        const BACKGROUND         = 0x0008;
        const PREFER_LINKED_CELS = 0x0010;
        const COLLAPSED          = 0x0020;
        const REFERENCE          = 0x0040;
    }
}

/// The layer kind, carrying the tileset index for tilemap layers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LayerType {
    Normal,
    Group,
    Tilemap { tileset_index: u32 },
}

/// Standard blend modes. Unknown values are preserved as `Other` rather
/// than being fatal, since blend mode never affects the current
/// compositing behavior (see `atlas::flatten`).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Addition,
    Subtraction,
    Divide,
    Other(u16),
}

impl BlendMode {
    fn from_u16(value: u16) -> Self {
        match value {
            0 => BlendMode::Normal,
            1 => BlendMode::Multiply,
            2 => BlendMode::Screen,
            3 => BlendMode::Overlay,
            4 => BlendMode::Darken,
            5 => BlendMode::Lighten,
            6 => BlendMode::ColorDodge,
            7 => BlendMode::ColorBurn,
            8 => BlendMode::HardLight,
            9 => BlendMode::SoftLight,
            10 => BlendMode::Difference,
            11 => BlendMode::Exclusion,
            12 => BlendMode::Hue,
            13 => BlendMode::Saturation,
            14 => BlendMode::Color,
            15 => BlendMode::Luminosity,
            16 => BlendMode::Addition,
            17 => BlendMode::Subtraction,
            18 => BlendMode::Divide,
            other => BlendMode::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerChunk {
    pub flags: LayerFlags,
    pub layer_type: LayerType,
    pub child_level: u16,
    pub blend_mode: BlendMode,
    pub opacity: u8,
    pub name: String,
}

impl LayerChunk {
    pub fn is_visible(&self) -> bool {
        self.flags.contains(LayerFlags::VISIBLE)
    }

    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let flags = LayerFlags::from_bits_truncate(cursor.read_u16()?);
        let kind = cursor.read_u16()?;
        let child_level = cursor.read_u16()?;
        cursor.skip(2)?; // default width in pixels, ignored
        cursor.skip(2)?; // default height in pixels, ignored
        let blend_mode = BlendMode::from_u16(cursor.read_u16()?);
        let opacity = cursor.read_u8()?;
        cursor.skip(3)?; // reserved
        let name = cursor.read_string()?;

        let layer_type = match kind {
            0 => LayerType::Normal,
            1 => LayerType::Group,
            2 => LayerType::Tilemap {
                tileset_index: cursor.read_u32()?,
            },
            other => {
                return Err(crate::error::DecodeError::not_supported(format!(
                    "unknown layer type {other}"
                )))
            }
        };

        Ok(LayerChunk {
            flags,
            layer_type,
            child_level,
            blend_mode,
            opacity,
            name,
        })
    }
}
