//! The polymorphic user-data properties tree.
//!
//! Each property value is dispatched on a 16-bit type tag. Maps nest
//! property values by construction, through an owned tree (`Vec`/`String`
//! allocations rather than arena slices) — a cycle would require a map to
//! contain itself, which the recursive-descent reader below cannot express.

use crate::io::Cursor;
use crate::math::{Point, Rect, Size};
use crate::error::DecodeError;
use std::collections::HashMap;

/// One property key's value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Fixed(f64),
    F32(f32),
    F64(f64),
    String(String),
    Point(Point),
    Size(Size),
    Rect(Rect),
    Uuid([u8; 16]),
    Vector(Vec<PropertyValue>),
    Map(PropertyMap),
}

/// A nested map from 32-bit keys to property values.
pub type PropertyMap = HashMap<u32, PropertyValue>;

/// Type tags for `PropertyValue`, in the order spec.md enumerates them.
mod tag {
    pub const NULL: u16 = 0x0000;
    pub const BOOL: u16 = 0x0001;
    pub const I8: u16 = 0x0002;
    pub const U8: u16 = 0x0003;
    pub const I16: u16 = 0x0004;
    pub const U16: u16 = 0x0005;
    pub const I32: u16 = 0x0006;
    pub const U32: u16 = 0x0007;
    pub const I64: u16 = 0x0008;
    pub const U64: u16 = 0x0009;
    pub const FIXED: u16 = 0x000A;
    pub const F32: u16 = 0x000B;
    pub const F64: u16 = 0x000C;
    pub const STRING: u16 = 0x000D;
    pub const POINT: u16 = 0x000E;
    pub const SIZE: u16 = 0x000F;
    pub const RECT: u16 = 0x0010;
    pub const UUID: u16 = 0x0011;
    pub const VECTOR: u16 = 0x0012;
    pub const MAP: u16 = 0x0013;
}

impl PropertyValue {
    /// Reads one tag-dispatched property value. An unrecognized tag is
    /// fatal (`InvalidPropertyType`) — unlike unknown chunk types, there
    /// is no byte-length prefix to skip by, so a property decoder cannot
    /// recover from an unknown variant.
    pub fn read(cursor: &mut Cursor) -> crate::io::Result<Self> {
        let kind = cursor.read_u16()?;
        Self::read_with_tag(cursor, kind)
    }

    fn read_with_tag(cursor: &mut Cursor, kind: u16) -> crate::io::Result<Self> {
        Ok(match kind {
            tag::NULL => PropertyValue::Null,
            tag::BOOL => PropertyValue::Bool(cursor.read_u8()? != 0),
            tag::I8 => PropertyValue::I8(cursor.read_i8()?),
            tag::U8 => PropertyValue::U8(cursor.read_u8()?),
            tag::I16 => PropertyValue::I16(cursor.read_i16()?),
            tag::U16 => PropertyValue::U16(cursor.read_u16()?),
            tag::I32 => PropertyValue::I32(cursor.read_i32()?),
            tag::U32 => PropertyValue::U32(cursor.read_u32()?),
            tag::I64 => PropertyValue::I64(cursor.read_i64()?),
            tag::U64 => PropertyValue::U64(cursor.read_u64()?),
            tag::FIXED => PropertyValue::Fixed(cursor.read_fixed()?),
            tag::F32 => PropertyValue::F32(cursor.read_f32()?),
            tag::F64 => PropertyValue::F64(cursor.read_f64()?),
            tag::STRING => PropertyValue::String(cursor.read_string()?),
            tag::POINT => {
                let x = cursor.read_i32()?;
                let y = cursor.read_i32()?;
                PropertyValue::Point(Point::new(x, y))
            }
            tag::SIZE => {
                let width = cursor.read_i32()?;
                let height = cursor.read_i32()?;
                PropertyValue::Size(Size::new(width, height))
            }
            tag::RECT => {
                let x = cursor.read_i32()?;
                let y = cursor.read_i32()?;
                let width = cursor.read_i32()?;
                let height = cursor.read_i32()?;
                PropertyValue::Rect(Rect::from_coords(x, y, width, height))
            }
            tag::UUID => PropertyValue::Uuid(cursor.read_uuid()?),
            tag::VECTOR => {
                let element_kind = cursor.read_u16()?;
                let count = cursor.read_u32()? as usize;
                let mut elements = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    elements.push(Self::read_with_tag(cursor, element_kind)?);
                }
                PropertyValue::Vector(elements)
            }
            tag::MAP => PropertyValue::Map(read_property_map(cursor)?),
            other => {
                return Err(DecodeError::InvalidPropertyType {
                    kind: other,
                    offset: cursor.position(),
                })
            }
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Reads a nested `Map` property value: a count followed by that many
/// literal `(u32 key, value)` pairs. This is distinct from the
/// outer shape the user-data chunk's properties block uses, where each
/// top-level map is keyed by a 32-bit extension id but its *entries*
/// are named strings — see `read_named_properties` below.
fn read_property_map(cursor: &mut Cursor) -> crate::io::Result<PropertyMap> {
    let count = cursor.read_u32()? as usize;
    let mut map = PropertyMap::with_capacity(count.min(4096));

    for _ in 0..count {
        let key = cursor.read_u32()?;
        let value = PropertyValue::read(cursor)?;
        map.insert(key, value);
    }

    Ok(map)
}

/// Reads a `name -> value` properties list, the shape used for each
/// extension's entries inside a user-data properties block.
pub fn read_named_properties(
    cursor: &mut Cursor,
) -> crate::io::Result<Vec<(String, PropertyValue)>> {
    let count = cursor.read_u32()? as usize;
    let mut entries = Vec::with_capacity(count.min(4096));

    for _ in 0..count {
        let name = cursor.read_string()?;
        let value = PropertyValue::read(cursor)?;
        entries.push((name, value));
    }

    Ok(entries)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_scalar_properties() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&tag::BOOL.to_le_bytes());
        bytes.push(1);
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(PropertyValue::read(&mut cursor).unwrap(), PropertyValue::Bool(true));
    }

    #[test]
    fn reads_homogeneous_vector() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&tag::VECTOR.to_le_bytes());
        bytes.extend_from_slice(&tag::I32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&7i32.to_le_bytes());
        bytes.extend_from_slice(&(-3i32).to_le_bytes());

        let mut cursor = Cursor::new(&bytes);
        let value = PropertyValue::read(&mut cursor).unwrap();
        assert_eq!(
            value,
            PropertyValue::Vector(vec![PropertyValue::I32(7), PropertyValue::I32(-3)])
        );
    }

    #[test]
    fn rejects_unknown_tag() {
        let bytes = 0xBEEFu16.to_le_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert!(PropertyValue::read(&mut cursor).is_err());
    }
}
