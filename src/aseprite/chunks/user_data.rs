//! `0x2020` user data chunk.
//!
//! Carries optional text, an optional RGBA color, and an optional
//! properties block. The properties block is a list of extensions, each
//! identified by a 32-bit key and holding its own `name -> value` table —
//! see `aseprite::property` for how that differs from a nested `Map`
//! property value.

use crate::aseprite::property::{read_named_properties, PropertyValue};
use crate::io::{Cursor, Result};

const FLAG_TEXT: u32 = 0x0001;
const FLAG_COLOR: u32 = 0x0002;
const FLAG_PROPERTIES: u32 = 0x0004;

#[derive(Debug, Clone)]
pub struct ExtensionProperties {
    pub extension_key: u32,
    pub entries: Vec<(String, PropertyValue)>,
}

#[derive(Debug, Clone, Default)]
pub struct UserDataChunk {
    pub text: Option<String>,
    pub color: Option<[u8; 4]>,
    pub properties: Vec<ExtensionProperties>,
}

impl UserDataChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let flags = cursor.read_u32()?;

        let text = if flags & FLAG_TEXT != 0 {
            Some(cursor.read_string()?)
        } else {
            None
        };

        let color = if flags & FLAG_COLOR != 0 {
            Some([
                cursor.read_u8()?,
                cursor.read_u8()?,
                cursor.read_u8()?,
                cursor.read_u8()?,
            ])
        } else {
            None
        };

        let properties = if flags & FLAG_PROPERTIES != 0 {
            cursor.skip(4)?; // total size of the properties block, unused
            let extension_count = cursor.read_u32()? as usize;
            let mut extensions = Vec::with_capacity(extension_count);

            for _ in 0..extension_count {
                let extension_key = cursor.read_u32()?;
                let entries = read_named_properties(cursor)?;
                extensions.push(ExtensionProperties {
                    extension_key,
                    entries,
                });
            }

            extensions
        } else {
            Vec::new()
        };

        Ok(UserDataChunk {
            text,
            color,
            properties,
        })
    }
}
