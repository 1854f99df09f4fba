//! Aseprite binary document model: file header, frames, and chunks.
//!
//! A `Document` owns every frame and chunk it decodes as plain owned
//! values (`Vec`/`String`). The binary format's own allocations never
//! outlive the read that produced them, so there is no need for an
//! arena or other shared-lifetime backing store — ordinary ownership
//! already gives the same non-escaping-borrow guarantee.

pub mod chunk;
pub mod chunks;
pub mod property;

use crate::error::DecodeError;
use crate::io::{Cursor, Result};
use chunk::Chunk;

const FILE_MAGIC: u16 = 0xA5E0;
const FRAME_MAGIC: u16 = 0xF1FA;
const HEADER_SIZE: usize = 128;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FileColorDepth {
    Rgba32,
    Grayscale16,
    Indexed8,
}

impl FileColorDepth {
    fn from_bits(bits: u16, offset: usize) -> Result<Self> {
        match bits {
            32 => Ok(FileColorDepth::Rgba32),
            16 => Ok(FileColorDepth::Grayscale16),
            8 => Ok(FileColorDepth::Indexed8),
            other => Err(DecodeError::not_supported(format!(
                "unsupported color depth {other} bits at offset {offset}"
            ))),
        }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    pub struct FileFlags: u32 {
        const LAYER_OPACITY_VALID = 0x0001;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GridBounds {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone)]
pub struct FileHeader {
    pub frame_count: u16,
    pub width: u16,
    pub height: u16,
    pub color_depth: FileColorDepth,
    pub flags: FileFlags,
    pub default_frame_duration_ms: u16,
    pub transparent_index: u8,
    pub palette_size: u16,
    /// `(x, y)`. A `0` component means 1:1.
    pub pixel_aspect_ratio: (u8, u8),
    pub grid: Option<GridBounds>,
}

impl FileHeader {
    fn read(cursor: &mut Cursor) -> Result<Self> {
        cursor.skip(4)?; // file size, recomputed on write rather than trusted
        let magic = cursor.read_u16()?;
        if magic != FILE_MAGIC {
            return Err(DecodeError::BadFileMagic {
                offset: cursor.position() - 2,
            });
        }

        let frame_count = cursor.read_u16()?;
        let width = cursor.read_u16()?;
        let height = cursor.read_u16()?;
        let color_depth = FileColorDepth::from_bits(cursor.read_u16()?, cursor.position())?;
        let flags = FileFlags::from_bits_truncate(cursor.read_u32()?);
        let default_frame_duration_ms = cursor.read_u16()?;
        cursor.skip(4)?; // reserved
        cursor.skip(4)?; // reserved
        let transparent_index = cursor.read_u8()?;
        cursor.skip(3)?; // reserved
        let mut palette_size = cursor.read_u16()?;
        if palette_size == 0 {
            palette_size = 256;
        }
        let pixel_width = cursor.read_u8()?;
        let pixel_height = cursor.read_u8()?;
        let grid_x = cursor.read_i16()?;
        let grid_y = cursor.read_i16()?;
        let grid_width = cursor.read_u16()?;
        let grid_height = cursor.read_u16()?;
        cursor.skip(84)?; // reserved

        let grid = if grid_width > 0 && grid_height > 0 {
            Some(GridBounds {
                x: grid_x,
                y: grid_y,
                width: grid_width,
                height: grid_height,
            })
        } else {
            None
        };

        Ok(FileHeader {
            frame_count,
            width,
            height,
            color_depth,
            flags,
            default_frame_duration_ms,
            transparent_index,
            palette_size,
            pixel_aspect_ratio: (
                if pixel_width == 0 { 1 } else { pixel_width },
                if pixel_height == 0 { 1 } else { pixel_height },
            ),
            grid,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub duration_ms: u16,
    pub chunks: Vec<Chunk>,
}

impl Frame {
    fn read(
        cursor: &mut Cursor,
        depth: FileColorDepth,
        default_duration_ms: u16,
        frame_index: usize,
    ) -> Result<Self> {
        let frame_start = cursor.position();
        cursor.skip(4)?; // bytes in this frame, recomputed on write
        let magic = cursor.read_u16()?;
        if magic != FRAME_MAGIC {
            return Err(DecodeError::BadFrameMagic {
                offset: frame_start + 4,
            });
        }

        let old_chunk_count = cursor.read_u16()?;
        let mut duration_ms = cursor.read_u16()?;
        if duration_ms == 0 {
            duration_ms = default_duration_ms;
        }
        cursor.skip(2)?; // reserved
        let new_chunk_count = cursor.read_u32()?;

        let chunk_count = if old_chunk_count == 0xFFFF || new_chunk_count > old_chunk_count as u32
        {
            new_chunk_count as usize
        } else {
            old_chunk_count as usize
        };

        let mut chunks = Vec::with_capacity(chunk_count);
        for _ in 0..chunk_count {
            chunks.push(Chunk::read(cursor, depth, frame_index)?);
        }

        Ok(Frame {
            duration_ms,
            chunks,
        })
    }
}

fn read_frame_filtered(
    cursor: &mut Cursor,
    depth: FileColorDepth,
    frame_index: usize,
    wanted: &[u16],
) -> Result<Vec<Chunk>> {
    let frame_start = cursor.position();
    cursor.skip(4)?; // bytes in this frame, recomputed on write
    let magic = cursor.read_u16()?;
    if magic != FRAME_MAGIC {
        return Err(DecodeError::BadFrameMagic {
            offset: frame_start + 4,
        });
    }

    let old_chunk_count = cursor.read_u16()?;
    cursor.skip(2)?; // duration, irrelevant to a filtered pass
    cursor.skip(2)?; // reserved
    let new_chunk_count = cursor.read_u32()?;

    let chunk_count = if old_chunk_count == 0xFFFF || new_chunk_count > old_chunk_count as u32 {
        new_chunk_count as usize
    } else {
        old_chunk_count as usize
    };

    let mut chunks = Vec::new();
    for _ in 0..chunk_count {
        if let Some(chunk) = Chunk::read_filtered(cursor, depth, frame_index, wanted)? {
            chunks.push(chunk);
        }
    }

    Ok(chunks)
}

/// Decodes only the chunks whose type appears in `wanted` from every
/// frame of `data`, one chunk list per frame. Shares the file-header and
/// frame-walk skeleton with `Document::decode`, the permissive main
/// pass, but dispatches through `Chunk::read_filtered`: a chunk type
/// this reader doesn't recognize at all is fatal here, since there is no
/// wider document to fall back to skipping it permissively.
pub fn decode_selected(data: &[u8], wanted: &[u16]) -> Result<Vec<Vec<Chunk>>> {
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::UnexpectedEnd {
            offset: 0,
            wanted: HEADER_SIZE,
        });
    }

    let mut cursor = Cursor::new(data);
    let header = FileHeader::read(&mut cursor)?;

    let mut frames = Vec::with_capacity(header.frame_count as usize);
    for frame_index in 0..header.frame_count as usize {
        frames.push(read_frame_filtered(
            &mut cursor,
            header.color_depth,
            frame_index,
            wanted,
        )?);
    }

    Ok(frames)
}

/// Single-variant convenience over `decode_selected`: every frame's
/// chunks of exactly `wanted` kind, in frame order.
pub fn decode_only(data: &[u8], wanted: u16) -> Result<Vec<Vec<Chunk>>> {
    decode_selected(data, &[wanted])
}

/// Enforces the tag-range invariant once every frame (and so the true
/// frame count) is known: `0 <= from <= to < frame_count`.
fn validate_tag_ranges(frames: &[Frame]) -> Result<()> {
    let frame_count = frames.len();
    for frame in frames {
        for chunk in &frame.chunks {
            let Chunk::Tags(tags_chunk) = chunk else {
                continue;
            };
            for tag in &tags_chunk.tags {
                if tag.from_frame > tag.to_frame || tag.to_frame as usize >= frame_count {
                    return Err(DecodeError::InvalidTagRange {
                        from: tag.from_frame,
                        to: tag.to_frame,
                        frame_count,
                    });
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Document {
    pub header: FileHeader,
    pub frames: Vec<Frame>,
}

impl Document {
    /// Decodes a whole Aseprite file from an in-memory buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(DecodeError::UnexpectedEnd {
                offset: 0,
                wanted: HEADER_SIZE,
            });
        }

        let mut cursor = Cursor::new(data);
        let header = FileHeader::read(&mut cursor)?;

        let mut frames = Vec::with_capacity(header.frame_count as usize);
        for frame_index in 0..header.frame_count as usize {
            frames.push(Frame::read(
                &mut cursor,
                header.color_depth,
                header.default_frame_duration_ms,
                frame_index,
            )?);
        }

        validate_tag_ranges(&frames)?;

        Ok(Document { header, frames })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn minimal_header(frame_count: u16, width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[4..6].copy_from_slice(&FILE_MAGIC.to_le_bytes());
        bytes[6..8].copy_from_slice(&frame_count.to_le_bytes());
        bytes[8..10].copy_from_slice(&width.to_le_bytes());
        bytes[10..12].copy_from_slice(&height.to_le_bytes());
        bytes[12..14].copy_from_slice(&32u16.to_le_bytes()); // RGBA depth
        bytes
    }

    #[test]
    fn rejects_bad_file_magic() {
        let mut bytes = minimal_header(0, 1, 1);
        bytes[4] = 0; // corrupt magic
        bytes[5] = 0;
        assert!(Document::decode(&bytes).is_err());
    }

    #[test]
    fn decodes_header_with_zero_frames() {
        let bytes = minimal_header(0, 16, 16);
        let document = Document::decode(&bytes).unwrap();
        assert_eq!(document.header.width, 16);
        assert_eq!(document.header.height, 16);
        assert_eq!(document.frames.len(), 0);
        assert_eq!(document.header.color_depth, FileColorDepth::Rgba32);
    }

    #[test]
    fn rejects_truncated_header() {
        let bytes = vec![0u8; 10];
        assert!(Document::decode(&bytes).is_err());
    }
}
