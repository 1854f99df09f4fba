//! `0x2023` tileset chunk.

use crate::error::DecodeError;
use crate::io::{Cursor, Result};
use bitflags::bitflags;
use flate2::bufread::ZlibDecoder;
use std::io::Read;

bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    pub struct TilesetFlags: u32 {
        const LINKS_EXTERNAL_FILE = 0x0001;
        const TILES_INCLUDED      = 0x0002;
        const ZERO_TILE_IS_EMPTY  = 0x0004;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExternalTilesetRef {
    pub file_id: u32,
    pub tileset_id: u32,
}

#[derive(Debug, Clone)]
pub struct TilesetChunk {
    pub id: u32,
    pub flags: TilesetFlags,
    pub tile_count: u32,
    pub tile_width: u16,
    pub tile_height: u16,
    pub base_index: i16,
    pub name: String,
    pub external: Option<ExternalTilesetRef>,
    /// RGBA pixels for the tileset sheet (all tiles stacked vertically),
    /// present when `TILES_INCLUDED` is set.
    pub image: Option<(u16, u16, Vec<u8>)>,
}

impl TilesetChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let id = cursor.read_u32()?;
        let flags = TilesetFlags::from_bits_truncate(cursor.read_u32()?);
        let tile_count = cursor.read_u32()?;
        let tile_width = cursor.read_u16()?;
        let tile_height = cursor.read_u16()?;
        let base_index = cursor.read_i16()?;
        cursor.skip(14)?; // reserved
        let name = cursor.read_string()?;

        let external = if flags.contains(TilesetFlags::LINKS_EXTERNAL_FILE) {
            Some(ExternalTilesetRef {
                file_id: cursor.read_u32()?,
                tileset_id: cursor.read_u32()?,
            })
        } else {
            None
        };

        let image = if flags.contains(TilesetFlags::TILES_INCLUDED) {
            let compressed_len = cursor.read_u32()? as usize;
            let compressed = cursor.read_bytes(compressed_len)?;

            let width = tile_width;
            let height = tile_height.saturating_mul(tile_count.max(1) as u16);
            let expected_len = width as usize * height as usize * 4;

            let mut decoder = ZlibDecoder::new(compressed);
            let mut pixels = Vec::with_capacity(expected_len);
            decoder
                .read_to_end(&mut pixels)
                .map_err(|error| DecodeError::decompress_failed(error.to_string()))?;

            Some((width, height, pixels))
        } else {
            None
        };

        Ok(TilesetChunk {
            id,
            flags,
            tile_count,
            tile_width,
            tile_height,
            base_index,
            name,
            external,
            image,
        })
    }
}
