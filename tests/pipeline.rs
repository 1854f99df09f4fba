//! End-to-end boundary-scenario tests exercising flattening, tile
//! extraction, and animation derivation against synthesized documents.

use aseatlas::aseprite::Document;
use aseatlas::atlas::{flatten, tiles};
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
    body.extend_from_slice(&[0u8; 2]);
    body.extend_from_slice(&(chunks.len() as u32).to_le_bytes());
    for chunk in chunks {
        body.extend_from_slice(chunk);
    }

    let mut frame = Vec::new();
    let frame_size = (body.len() + 4 + 2 + 2) as u32;
    frame.extend_from_slice(&frame_size.to_le_bytes());
    frame.extend_from_slice(&FRAME_MAGIC.to_le_bytes());
    frame.extend_from_slice(&0xFFFFu16.to_le_bytes());
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

fn layer_chunk() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u16.to_le_bytes()); // visible
    payload.extend_from_slice(&0u16.to_le_bytes()); // normal
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&[0u8; 4]);
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.push(255);
    payload.extend_from_slice(&[0u8; 3]);
    payload.extend_from_slice(&0u16.to_le_bytes());
    build_chunk(0x2004, &payload)
}

fn indexed_cel_chunk(width: u16, height: u16, indices: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u16.to_le_bytes()); // layer index
    payload.extend_from_slice(&0i16.to_le_bytes()); // x
    payload.extend_from_slice(&0i16.to_le_bytes()); // y
    payload.push(255);
    payload.extend_from_slice(&2u16.to_le_bytes());
    payload.extend_from_slice(&0i16.to_le_bytes());
    payload.extend_from_slice(&[0u8; 7]);
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    payload.extend_from_slice(&zlib_compress(indices));
    build_chunk(0x2005, &payload)
}

fn modern_palette_chunk(colors: &[[u8; 4]]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(colors.len() as u32).to_le_bytes()); // new_size
    payload.extend_from_slice(&0u32.to_le_bytes()); // first_index
    payload.extend_from_slice(&((colors.len() - 1) as u32).to_le_bytes()); // last_index
    payload.extend_from_slice(&[0u8; 8]); // reserved
    for color in colors {
        payload.extend_from_slice(&0u16.to_le_bytes()); // flags, no name
        payload.extend_from_slice(color);
    }
    build_chunk(0x2019, &payload)
}

/// Scenario 2: indexed color with palette index 0 transparent.
#[test]
fn indexed_palette_index_zero_is_transparent() {
    let palette = modern_palette_chunk(&[[0, 0, 0, 0], [255, 0, 0, 255]]);
    let layer = layer_chunk();
    let cel = indexed_cel_chunk(2, 1, &[0, 1]);

    let frame = build_frame(&[palette, layer, cel], 0);
    let bytes = build_file(2, 1, 8, &[frame]);

    let document = Document::decode(&bytes).unwrap();
    let frames = flatten::flatten_frames(&document).unwrap();
    assert_eq!(frames.len(), 1);

    let flattened = frames[0].as_ref().unwrap();
    assert_eq!(flattened.document_width, 2);
    assert_eq!(flattened.document_height, 1);
    assert_eq!(flattened.offset_left, 0);
    assert_eq!(flattened.offset_top, 0);
    assert_eq!(flattened.offset_right, 0);
    assert_eq!(flattened.offset_bottom, 0);

    let image = &flattened.image;
    assert_eq!(*image.get_pixel(0, 0), image::Rgba([0, 0, 0, 0]));
    assert_eq!(*image.get_pixel(1, 0), image::Rgba([255, 0, 0, 255]));
}

fn rgba_cel_chunk(width: u16, height: u16, pixels: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&0i16.to_le_bytes());
    payload.extend_from_slice(&0i16.to_le_bytes());
    payload.push(255);
    payload.extend_from_slice(&2u16.to_le_bytes());
    payload.extend_from_slice(&0i16.to_le_bytes());
    payload.extend_from_slice(&[0u8; 7]);
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    payload.extend_from_slice(&zlib_compress(pixels));
    build_chunk(0x2005, &payload)
}

fn tags_chunk(entries: &[(u16, u16, &str, u16)]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    payload.extend_from_slice(&[0u8; 8]);
    for (from, to, name, repeat) in entries {
        payload.extend_from_slice(&from.to_le_bytes());
        payload.extend_from_slice(&to.to_le_bytes());
        payload.push(0); // forward direction
        payload.extend_from_slice(&repeat.to_le_bytes());
        payload.extend_from_slice(&[0u8; 6]);
        payload.extend_from_slice(&[0u8; 3]); // deprecated color
        payload.push(0);
        payload.extend_from_slice(&(name.len() as u16).to_le_bytes());
        payload.extend_from_slice(name.as_bytes());
    }
    build_chunk(0x2018, &payload)
}

/// Scenarios 3 & 4: a two-frame document without tags synthesizes a
/// whole-document animation; with a tag spanning both frames, only the
/// tag-derived animation appears.
#[test]
fn two_frame_animation_derivation() {
    let layer = layer_chunk();
    let cel_a = rgba_cel_chunk(1, 1, &[255, 255, 255, 255]);
    let cel_b = rgba_cel_chunk(1, 1, &[0, 0, 0, 255]);

    let frame_a = build_frame(&[layer.clone(), cel_a.clone()], 0);
    let frame_b = build_frame(&[cel_b.clone()], 0);
    let untagged = build_file(1, 1, 32, &[frame_a.clone(), frame_b.clone()]);

    let document = Document::decode(&untagged).unwrap();
    let animations = aseatlas::atlas::collect_animations(&document, "base_name");
    assert_eq!(animations.len(), 1);
    assert_eq!(animations[0].name, "base_name_All");
    assert_eq!(
        animations[0].frame_labels,
        vec!["base_name_0".to_string(), "base_name_1".to_string()]
    );

    let tags = tags_chunk(&[(0, 1, "walk", 0)]);
    let frame_a_tagged = build_frame(&[layer, tags, cel_a], 0);
    let tagged = build_file(1, 1, 32, &[frame_a_tagged, frame_b]);

    let document = Document::decode(&tagged).unwrap();
    let animations = aseatlas::atlas::collect_animations(&document, "base_name");
    assert_eq!(animations.len(), 1);
    assert_eq!(animations[0].name, "base_name_walk");
}

/// Scenario 5: a tileset with one fully-transparent tile discards only
/// that tile.
#[test]
fn transparent_tile_is_discarded() {
    // Two 2x2 tiles stacked vertically: tile 0 opaque, tile 1 fully transparent.
    let mut pixels = Vec::new();
    for _ in 0..(2 * 2) {
        pixels.extend_from_slice(&[10, 20, 30, 255]);
    }
    for _ in 0..(2 * 2) {
        pixels.extend_from_slice(&[0, 0, 0, 0]);
    }

    let mut tileset_payload = Vec::new();
    tileset_payload.extend_from_slice(&0u32.to_le_bytes()); // id
    tileset_payload.extend_from_slice(&0x0002u32.to_le_bytes()); // TILES_INCLUDED
    tileset_payload.extend_from_slice(&2u32.to_le_bytes()); // tile_count
    tileset_payload.extend_from_slice(&2u16.to_le_bytes()); // tile_width
    tileset_payload.extend_from_slice(&2u16.to_le_bytes()); // tile_height
    tileset_payload.extend_from_slice(&0i16.to_le_bytes()); // base index
    tileset_payload.extend_from_slice(&[0u8; 14]);
    tileset_payload.extend_from_slice(&0u16.to_le_bytes()); // empty name
    let compressed = zlib_compress(&pixels);
    tileset_payload.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    tileset_payload.extend_from_slice(&compressed);
    let tileset = build_chunk(0x2023, &tileset_payload);

    let frame = build_frame(&[tileset], 0);
    let bytes = build_file(1, 1, 32, &[frame]);

    let document = Document::decode(&bytes).unwrap();
    let extracted = tiles::extract_tiles(&document).unwrap();
    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].1, "0");
}
