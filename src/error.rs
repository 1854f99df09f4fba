//! Error taxonomy for decoding, packing, and cataloguing.
//!
//! Mirrors the closed taxonomy a chunked binary format decoder needs:
//! structural framing errors, semantic errors, and I/O errors, each
//! carrying the byte offset at which they occurred when that is known.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors produced while decoding an Aseprite document.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("bad file magic at offset {offset}: expected 0xA5E0")]
    BadFileMagic { offset: usize },

    #[error("bad frame magic at offset {offset}: expected 0xF1FA")]
    BadFrameMagic { offset: usize },

    #[error("unexpected end of stream at offset {offset}: wanted {wanted} more bytes")]
    UnexpectedEnd { offset: usize, wanted: usize },

    #[error("declared file size {declared} does not match stream length {actual}")]
    DataSizeMismatch { declared: u32, actual: u64 },

    #[error("invalid chunk type 0x{kind:04X} at offset {offset}")]
    InvalidChunkType { kind: u16, offset: usize },

    #[error("chunk declared length {declared} is smaller than its own 6-byte header at offset {offset}")]
    ChunkTooShort { declared: usize, offset: usize },

    #[error("invalid cel type {kind} at offset {offset}")]
    InvalidCelType { kind: u16, offset: usize },

    #[error("invalid property type 0x{kind:04X} at offset {offset}")]
    InvalidPropertyType { kind: u16, offset: usize },

    #[error("invalid utf-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("indexed color depth requires at least one palette chunk")]
    MissingPaletteForIndexed,

    #[error("a cel references layer index {layer_index}, but only {layer_count} layers were seen")]
    CelLayerOutOfRange {
        layer_index: usize,
        layer_count: usize,
    },

    #[error("a linked cel in frame {frame} references frame {referenced}, which is not earlier")]
    LinkedCelNotBackward { frame: usize, referenced: usize },

    #[error("tag from={from} to={to} is out of range for {frame_count} frames")]
    InvalidTagRange {
        from: u16,
        to: u16,
        frame_count: usize,
    },

    #[error("read failed: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("zlib decompression failed: {0}")]
    DecompressFailed(String),

    #[error("feature not supported: {0}")]
    NotSupported(String),
}

impl DecodeError {
    pub fn decompress_failed(message: impl Into<String>) -> Self {
        DecodeError::DecompressFailed(message.into())
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        DecodeError::NotSupported(message.into())
    }
}

/// Errors produced while packing rectangles into the atlas.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("no textures, tiles, or glyphs were produced for this batch")]
    NoRectanglesToPack,

    #[error("failed to write atlas image: {0}")]
    ImageWriteFailed(String),
}

/// Errors produced while emitting the metadata catalogue.
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("failed to write catalogue file: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// Errors surfaced at the CLI boundary. Per-file decode failures are
/// logged and skipped by the orchestrator rather than propagated here;
/// this type covers failures that end the whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input directory {0} contained no usable sprite sources")]
    EmptyInputDirectory(String),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
