//! The per-frame chunk dispatch: reads a chunk's 4-byte length and 2-byte
//! type, then decodes the payload for recognized types or skips the
//! remainder for unrecognized ones.

use crate::error::DecodeError;
use crate::io::{Cursor, Result};
use log::debug;

use super::chunks::{
    cel::{CelChunk, CelExtraChunk},
    color_profile::ColorProfileChunk,
    external_files::ExternalFilesChunk,
    layer::LayerChunk,
    mask::MaskChunk,
    palette::{LegacyPaletteChunk, PaletteChunk},
    slice::SliceChunk,
    tags::TagsChunk,
    tileset::TilesetChunk,
    user_data::UserDataChunk,
};
use super::FileColorDepth;

pub(crate) mod kind {
    pub const OLD_PALETTE_4: u16 = 0x0004;
    pub const OLD_PALETTE_11: u16 = 0x0011;
    pub const LAYER: u16 = 0x2004;
    pub const CEL: u16 = 0x2005;
    pub const CEL_EXTRA: u16 = 0x2006;
    pub const COLOR_PROFILE: u16 = 0x2007;
    pub const EXTERNAL_FILES: u16 = 0x2008;
    pub const MASK: u16 = 0x2016;
    pub const PATH: u16 = 0x2017;
    pub const TAGS: u16 = 0x2018;
    pub const PALETTE: u16 = 0x2019;
    pub const USER_DATA: u16 = 0x2020;
    pub const SLICE: u16 = 0x2022;
    pub const TILESET: u16 = 0x2023;
}

/// Every chunk-type code this reader knows about, whether or not it
/// decodes it into a dedicated variant. Used by the strict filtered
/// passes to tell "not wanted, but harmless to skip" apart from
/// "genuinely unrecognized" — only the latter is fatal there.
fn is_recognized_kind(chunk_type: u16) -> bool {
    matches!(
        chunk_type,
        kind::OLD_PALETTE_4
            | kind::OLD_PALETTE_11
            | kind::LAYER
            | kind::CEL
            | kind::CEL_EXTRA
            | kind::COLOR_PROFILE
            | kind::EXTERNAL_FILES
            | kind::MASK
            | kind::PATH
            | kind::TAGS
            | kind::PALETTE
            | kind::USER_DATA
            | kind::SLICE
            | kind::TILESET
    )
}

/// A decoded chunk, or `Skipped` for a recognized-but-irrelevant or
/// wholly unrecognized chunk type.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// `bool` is `true` when this came from the 64-level-per-component
    /// (`0x0011`) variant rather than the 256-level (`0x0004`) one.
    OldPalette(bool, LegacyPaletteChunk),
    Layer(LayerChunk),
    Cel(CelChunk),
    CelExtra(CelExtraChunk),
    ColorProfile(ColorProfileChunk),
    ExternalFiles(ExternalFilesChunk),
    Mask(MaskChunk),
    Tags(TagsChunk),
    Palette(PaletteChunk),
    UserData(UserDataChunk),
    Slice(SliceChunk),
    Tileset(TilesetChunk),
    Skipped { kind: u16 },
}

/// Decodes a chunk type this reader recognizes. Callers are expected to
/// have already checked `is_recognized_kind` (or narrowed to `wanted`);
/// passing an unrecognized `chunk_type` panics.
fn decode_known(
    cursor: &mut Cursor,
    chunk_type: u16,
    depth: FileColorDepth,
    payload_len: usize,
    frame_index: usize,
) -> Result<Chunk> {
    Ok(match chunk_type {
        kind::OLD_PALETTE_4 => Chunk::OldPalette(false, LegacyPaletteChunk::read(cursor)?),
        kind::OLD_PALETTE_11 => Chunk::OldPalette(true, LegacyPaletteChunk::read(cursor)?),
        kind::LAYER => Chunk::Layer(LayerChunk::read(cursor)?),
        kind::CEL => Chunk::Cel(CelChunk::read(cursor, payload_len, depth, frame_index)?),
        kind::CEL_EXTRA => Chunk::CelExtra(CelExtraChunk::read(cursor)?),
        kind::COLOR_PROFILE => Chunk::ColorProfile(ColorProfileChunk::read(cursor)?),
        kind::EXTERNAL_FILES => Chunk::ExternalFiles(ExternalFilesChunk::read(cursor)?),
        kind::MASK => Chunk::Mask(MaskChunk::read(cursor)?),
        kind::TAGS => Chunk::Tags(TagsChunk::read(cursor)?),
        kind::PALETTE => Chunk::Palette(PaletteChunk::read(cursor)?),
        kind::USER_DATA => Chunk::UserData(UserDataChunk::read(cursor)?),
        kind::SLICE => Chunk::Slice(SliceChunk::read(cursor)?),
        kind::TILESET => Chunk::Tileset(TilesetChunk::read(cursor)?),
        kind::PATH => Chunk::Skipped { kind: chunk_type },
        other => unreachable!("decode_known called with unrecognized chunk type 0x{other:04X}"),
    })
}

impl Chunk {
    /// Reads one chunk starting at `cursor`'s current position. `depth`
    /// is needed to size raw and compressed cel pixel buffers, and
    /// `frame_index` to validate a linked cel's referenced frame. This is
    /// the permissive main pass: a chunk type this reader has never
    /// heard of is skipped by its declared length rather than failed.
    pub fn read(cursor: &mut Cursor, depth: FileColorDepth, frame_index: usize) -> Result<Self> {
        let chunk_start = cursor.position();
        let declared_length = cursor.read_u32()? as usize;
        let chunk_type = cursor.read_u16()?;

        if declared_length < 6 {
            return Err(DecodeError::ChunkTooShort {
                declared: declared_length,
                offset: chunk_start,
            });
        }

        let payload_len = declared_length - 6;
        let payload_end = cursor.position() + payload_len;

        let chunk = if is_recognized_kind(chunk_type) {
            decode_known(cursor, chunk_type, depth, payload_len, frame_index)?
        } else {
            debug!("skipping unknown chunk type 0x{chunk_type:04X} at offset {chunk_start}");
            Chunk::Skipped { kind: chunk_type }
        };

        // A decoder that under- or over-reads its payload must not be
        // allowed to desynchronize the frame's chunk stream: always
        // resume from the chunk's declared end.
        if cursor.position() < payload_end {
            cursor.skip(payload_end - cursor.position())?;
        } else if cursor.position() > payload_end {
            return Err(DecodeError::DataSizeMismatch {
                declared: declared_length as u32,
                actual: (cursor.position() - chunk_start) as u64,
            });
        }

        Ok(chunk)
    }

    /// The strict, filtered pass backing the selective/single-variant
    /// decoders in `aseprite::decode_selected`/`decode_only`: a chunk
    /// whose type is in `wanted` is fully decoded; any other chunk type
    /// this reader still recognizes is skipped by its declared length;
    /// a wholly unrecognized type is fatal, since a caller asking for a
    /// narrow subset of chunks has no permissive fallback to recover
    /// through. Returns `None` for a recognized-but-unwanted chunk.
    pub fn read_filtered(
        cursor: &mut Cursor,
        depth: FileColorDepth,
        frame_index: usize,
        wanted: &[u16],
    ) -> Result<Option<Self>> {
        let chunk_start = cursor.position();
        let declared_length = cursor.read_u32()? as usize;
        let chunk_type = cursor.read_u16()?;

        if declared_length < 6 {
            return Err(DecodeError::ChunkTooShort {
                declared: declared_length,
                offset: chunk_start,
            });
        }

        let payload_len = declared_length - 6;
        let payload_end = cursor.position() + payload_len;

        let chunk = if wanted.contains(&chunk_type) {
            Some(decode_known(cursor, chunk_type, depth, payload_len, frame_index)?)
        } else if is_recognized_kind(chunk_type) {
            None
        } else {
            return Err(DecodeError::InvalidChunkType {
                kind: chunk_type,
                offset: chunk_start,
            });
        };

        if cursor.position() < payload_end {
            cursor.skip(payload_end - cursor.position())?;
        } else if cursor.position() > payload_end {
            return Err(DecodeError::DataSizeMismatch {
                declared: declared_length as u32,
                actual: (cursor.position() - chunk_start) as u64,
            });
        }

        Ok(chunk)
    }
}
