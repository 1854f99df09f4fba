//! `0x2005` cel chunk and `0x2006` cel-extra chunk.

use crate::error::DecodeError;
use crate::io::{Cursor, Result};
use flate2::bufread::ZlibDecoder;
use std::io::Read;

use super::super::FileColorDepth;

/// Bytes per pixel for a given color depth, used to size raw/compressed
/// pixel buffers.
fn bytes_per_pixel(depth: FileColorDepth) -> usize {
    match depth {
        FileColorDepth::Rgba32 => 4,
        FileColorDepth::Grayscale16 => 2,
        FileColorDepth::Indexed8 => 1,
    }
}

/// Isolates the tile identity, X-flip, Y-flip, and 90-degree rotation
/// bits packed into one tile word.
#[derive(Debug, Clone, Copy)]
pub struct TileBitmasks {
    pub tile_id: u32,
    pub x_flip: u32,
    pub y_flip: u32,
    pub rotate_90: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TileBitWidth {
    Bits8,
    Bits16,
    Bits32,
}

impl TileBitWidth {
    fn from_u16(value: u16) -> Result<Self> {
        match value {
            8 => Ok(TileBitWidth::Bits8),
            16 => Ok(TileBitWidth::Bits16),
            32 => Ok(TileBitWidth::Bits32),
            other => Err(DecodeError::not_supported(format!(
                "unsupported tile bit width {other}"
            ))),
        }
    }

    pub fn byte_width(self) -> usize {
        match self {
            TileBitWidth::Bits8 => 1,
            TileBitWidth::Bits16 => 2,
            TileBitWidth::Bits32 => 4,
        }
    }
}

/// One decoded tile reference: the raw tile word split into its
/// identity and orientation bits via the chunk's bitmasks.
#[derive(Debug, Clone, Copy)]
pub struct TileRef {
    pub tile_id: u32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub rotate_90: bool,
}

fn split_tile_word(word: u32, masks: TileBitmasks) -> TileRef {
    TileRef {
        tile_id: word & masks.tile_id,
        flip_x: word & masks.x_flip != 0,
        flip_y: word & masks.y_flip != 0,
        rotate_90: word & masks.rotate_90 != 0,
    }
}

/// The payload of a cel, dispatched on the 16-bit cel type field.
#[derive(Debug, Clone)]
pub enum CelContent {
    Raw {
        width: u16,
        height: u16,
        pixels: Vec<u8>,
    },
    Linked {
        frame: u16,
    },
    CompressedImage {
        width: u16,
        height: u16,
        pixels: Vec<u8>,
    },
    CompressedTilemap {
        width: u16,
        height: u16,
        bit_width: TileBitWidth,
        tiles: Vec<TileRef>,
    },
}

#[derive(Debug, Clone)]
pub struct CelChunk {
    pub layer_index: u16,
    pub x: i16,
    pub y: i16,
    pub opacity: u8,
    pub z_index: i16,
    pub content: CelContent,
}

fn inflate(compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut buffer = Vec::with_capacity(expected_len);
    decoder
        .read_to_end(&mut buffer)
        .map_err(|error| DecodeError::decompress_failed(error.to_string()))?;

    if buffer.len() < expected_len {
        return Err(DecodeError::decompress_failed(format!(
            "expected {expected_len} bytes, got {}",
            buffer.len()
        )));
    }

    buffer.truncate(expected_len);
    Ok(buffer)
}

impl CelChunk {
    /// `frame_index` is this cel's containing frame, needed to reject a
    /// `Linked` cel that does not point strictly backward.
    pub fn read(
        cursor: &mut Cursor,
        remaining: usize,
        depth: FileColorDepth,
        frame_index: usize,
    ) -> Result<Self> {
        let start = cursor.position();
        let layer_index = cursor.read_u16()?;
        let x = cursor.read_i16()?;
        let y = cursor.read_i16()?;
        let opacity = cursor.read_u8()?;
        let cel_type = cursor.read_u16()?;
        let z_index = cursor.read_i16()?;
        cursor.skip(7)?; // reserved

        let content = match cel_type {
            0 => {
                let width = cursor.read_u16()?;
                let height = cursor.read_u16()?;
                let byte_count = width as usize * height as usize * bytes_per_pixel(depth);
                let pixels = cursor.read_vec(byte_count)?;
                CelContent::Raw {
                    width,
                    height,
                    pixels,
                }
            }
            1 => {
                let referenced = cursor.read_u16()?;
                if referenced as usize >= frame_index {
                    return Err(DecodeError::LinkedCelNotBackward {
                        frame: frame_index,
                        referenced: referenced as usize,
                    });
                }
                CelContent::Linked { frame: referenced }
            }
            2 => {
                let width = cursor.read_u16()?;
                let height = cursor.read_u16()?;
                let consumed_so_far = cursor.position() - start;
                let compressed_len = remaining.saturating_sub(consumed_so_far);
                let compressed = cursor.read_bytes(compressed_len)?;
                let expected_len = width as usize * height as usize * bytes_per_pixel(depth);
                let pixels = inflate(compressed, expected_len)?;
                CelContent::CompressedImage {
                    width,
                    height,
                    pixels,
                }
            }
            3 => {
                let width = cursor.read_u16()?;
                let height = cursor.read_u16()?;
                let bit_width = TileBitWidth::from_u16(cursor.read_u16()?)?;
                let masks = TileBitmasks {
                    tile_id: cursor.read_u32()?,
                    x_flip: cursor.read_u32()?,
                    y_flip: cursor.read_u32()?,
                    rotate_90: cursor.read_u32()?,
                };
                cursor.skip(10)?; // reserved

                let consumed_so_far = cursor.position() - start;
                let compressed_len = remaining.saturating_sub(consumed_so_far);
                let compressed = cursor.read_bytes(compressed_len)?;

                let tile_count = width as usize * height as usize;
                let expected_len = tile_count * bit_width.byte_width();
                let raw = inflate(compressed, expected_len)?;

                let mut tiles = Vec::with_capacity(tile_count);
                let mut word_cursor = Cursor::new(&raw);
                for _ in 0..tile_count {
                    let word = match bit_width {
                        TileBitWidth::Bits8 => u32::from(word_cursor.read_u8()?),
                        TileBitWidth::Bits16 => u32::from(word_cursor.read_u16()?),
                        TileBitWidth::Bits32 => word_cursor.read_u32()?,
                    };
                    tiles.push(split_tile_word(word, masks));
                }

                CelContent::CompressedTilemap {
                    width,
                    height,
                    bit_width,
                    tiles,
                }
            }
            other => {
                return Err(DecodeError::InvalidCelType {
                    kind: other,
                    offset: cursor.position(),
                })
            }
        };

        Ok(CelChunk {
            layer_index,
            x,
            y,
            opacity,
            z_index,
            content,
        })
    }
}

/// `0x2006` cel-extra chunk: precise subpixel position/size for a cel.
#[derive(Debug, Clone, Copy)]
pub struct CelExtraChunk {
    pub precise_position: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CelExtraChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let flags = cursor.read_u32()?;
        Ok(CelExtraChunk {
            precise_position: flags & 0x0001 != 0,
            x: cursor.read_fixed()?,
            y: cursor.read_fixed()?,
            width: cursor.read_fixed()?,
            height: cursor.read_fixed()?,
        })
    }
}
