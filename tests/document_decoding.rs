//! Boundary-scenario integration tests for the Aseprite document decoder,
//! synthesizing minimal valid files byte-for-byte rather than relying on
//! checked-in binary fixtures.

use aseatlas::aseprite::chunk::Chunk;
use aseatlas::aseprite::chunks::cel::CelContent;
use aseatlas::aseprite::Document;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

const FILE_MAGIC: u16 = 0xA5E0;
const FRAME_MAGIC: u16 = 0xF1FA;

fn build_chunk(chunk_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let length = (payload.len() + 6) as u32;
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(&chunk_type.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

fn build_frame(chunks: &[Vec<u8>], duration_ms: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&duration_ms.to_le_bytes());
    body.extend_from_slice(&[0u8; 2]); // reserved
    body.extend_from_slice(&(chunks.len() as u32).to_le_bytes());
    for chunk in chunks {
        body.extend_from_slice(chunk);
    }

    let mut frame = Vec::new();
    let frame_size = (body.len() + 4 + 2 + 2) as u32;
    frame.extend_from_slice(&frame_size.to_le_bytes());
    frame.extend_from_slice(&FRAME_MAGIC.to_le_bytes());
    frame.extend_from_slice(&0xFFFFu16.to_le_bytes()); // force new_chunk_count path
    frame.extend_from_slice(&body);
    frame
}

fn build_file(width: u16, height: u16, depth_bits: u16, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut header = vec![0u8; 128];
    header[4..6].copy_from_slice(&FILE_MAGIC.to_le_bytes());
    header[6..8].copy_from_slice(&(frames.len() as u16).to_le_bytes());
    header[8..10].copy_from_slice(&width.to_le_bytes());
    header[10..12].copy_from_slice(&height.to_le_bytes());
    header[12..14].copy_from_slice(&depth_bits.to_le_bytes());

    let mut file = header;
    for frame in frames {
        file.extend_from_slice(frame);
    }
    file
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn cel_chunk(layer_index: u16, x: i16, y: i16, width: u16, height: u16, rgba_pixels: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&layer_index.to_le_bytes());
    payload.extend_from_slice(&x.to_le_bytes());
    payload.extend_from_slice(&y.to_le_bytes());
    payload.push(255); // opacity
    payload.extend_from_slice(&2u16.to_le_bytes()); // Compressed_Image
    payload.extend_from_slice(&0i16.to_le_bytes()); // z-index
    payload.extend_from_slice(&[0u8; 7]); // reserved
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    payload.extend_from_slice(&zlib_compress(rgba_pixels));
    build_chunk(0x2005, &payload)
}

/// Scenario 1: minimum document — one 1x1 RGBA frame with a single red
/// opaque pixel.
#[test]
fn minimum_document_decodes_one_red_pixel() {
    let cel = cel_chunk(0, 0, 0, 1, 1, &[0xFF, 0x00, 0x00, 0xFF]);
    let layer = build_chunk(
        0x2004,
        &{
            let mut payload = Vec::new();
            payload.extend_from_slice(&1u16.to_le_bytes()); // visible
            payload.extend_from_slice(&0u16.to_le_bytes()); // normal layer
            payload.extend_from_slice(&0u16.to_le_bytes()); // child level
            payload.extend_from_slice(&[0u8; 4]); // default w/h, ignored
            payload.extend_from_slice(&0u16.to_le_bytes()); // blend mode
            payload.push(255); // opacity
            payload.extend_from_slice(&[0u8; 3]); // reserved
            payload.extend_from_slice(&0u16.to_le_bytes()); // empty name
            payload
        },
    );

    let frame = build_frame(&[layer, cel], 0);
    let bytes = build_file(1, 1, 32, &[frame]);

    let document = Document::decode(&bytes).unwrap();
    assert_eq!(document.frames.len(), 1);

    let cels: Vec<_> = document.frames[0]
        .chunks
        .iter()
        .filter_map(|chunk| match chunk {
            Chunk::Cel(cel) => Some(cel),
            _ => None,
        })
        .collect();
    assert_eq!(cels.len(), 1);

    match &cels[0].content {
        CelContent::CompressedImage {
            width,
            height,
            pixels,
        } => {
            assert_eq!((*width, *height), (1, 1));
            assert_eq!(pixels.as_slice(), &[0xFF, 0x00, 0x00, 0xFF]);
        }
        other => panic!("expected compressed image cel, got {other:?}"),
    }
}

/// Scenario 6: an unrecognized chunk type in the middle of a frame is
/// skipped without desynchronizing the reader.
#[test]
fn unknown_chunk_type_is_skipped() {
    let unknown = build_chunk(0x9999, &[1, 2, 3, 4, 5, 6, 7, 8]);
    let cel = cel_chunk(0, 0, 0, 1, 1, &[0, 0, 0, 0]);

    let frame = build_frame(&[unknown, cel], 0);
    let bytes = build_file(1, 1, 32, &[frame]);

    let document = Document::decode(&bytes).unwrap();
    let chunk_count = document.frames[0].chunks.len();
    assert_eq!(chunk_count, 2);
    assert!(matches!(document.frames[0].chunks[0], Chunk::Skipped { kind: 0x9999 }));
    assert!(matches!(document.frames[0].chunks[1], Chunk::Cel(_)));
}

/// Zero-frame documents decode cleanly with an empty frame list.
#[test]
fn empty_document_has_no_frames() {
    let bytes = build_file(0, 0, 32, &[]);
    let document = Document::decode(&bytes).unwrap();
    assert!(document.frames.is_empty());
}
