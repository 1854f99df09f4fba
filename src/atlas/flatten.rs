//! Per-frame layer flattening.
//!
//! Composites every visible, non-group layer's cel into one RGBA image
//! per frame, back-to-front by layer index. Only `Compressed_Image` cels
//! contribute pixels — `Raw` and `Linked` cels from visible layers are
//! silently ignored (see spec's open question on this), and tilemap
//! cels are left to `atlas::tiles` instead. Compositing is a flat
//! replace, never alpha blended: a fully-opaque source pixel overwrites
//! whatever was there, and a fully-transparent source pixel (including
//! palette index 0 in indexed mode) leaves the destination untouched.
//! This mirrors how the original editor previews a single frame's layer
//! stack rather than rendering it the way a compositor would.
//!
//! The flattened buffer is cropped to the enclosing bounding box of the
//! frame's selected cels, itself clipped against the document rectangle
//! to produce the *source rectangle* — the part of the frame the atlas
//! actually stores. The whitespace trimmed from each side of the
//! document to reach that rectangle is recorded as four edge offsets.

use crate::aseprite::chunk::Chunk;
use crate::aseprite::chunks::cel::CelContent;
use crate::aseprite::chunks::layer::LayerType;
use crate::aseprite::chunks::palette::Palette;
use crate::aseprite::{Document, FileColorDepth};
use crate::error::DecodeError;
use crate::io::Result;
use crate::math::Rect;
use image::RgbaImage;

struct ResolvedLayer {
    visible: bool,
    is_flattenable: bool,
}

fn resolve_layers(document: &Document) -> Vec<ResolvedLayer> {
    let mut layers = Vec::new();
    for frame in &document.frames {
        for chunk in &frame.chunks {
            if let Chunk::Layer(layer) = chunk {
                layers.push(ResolvedLayer {
                    visible: layer.is_visible(),
                    is_flattenable: matches!(layer.layer_type, LayerType::Normal),
                });
            }
        }
        // Layer chunks only ever appear once, in the first frame.
        if !layers.is_empty() {
            break;
        }
    }
    layers
}

fn resolve_palette(document: &Document) -> Palette {
    let mut palette = Palette::default();
    for frame in &document.frames {
        for chunk in &frame.chunks {
            match chunk {
                Chunk::OldPalette(is_64_level, legacy) => {
                    palette.apply_legacy(legacy, *is_64_level);
                }
                Chunk::Palette(modern) => {
                    palette.apply_modern(modern);
                }
                _ => {}
            }
        }
    }
    palette
}

fn pixel_to_rgba(
    pixels: &[u8],
    pixel_index: usize,
    depth: FileColorDepth,
    palette: &Palette,
) -> Result<[u8; 4]> {
    match depth {
        FileColorDepth::Rgba32 => {
            let offset = pixel_index * 4;
            Ok([
                pixels[offset],
                pixels[offset + 1],
                pixels[offset + 2],
                pixels[offset + 3],
            ])
        }
        FileColorDepth::Grayscale16 => {
            let offset = pixel_index * 2;
            let value = pixels[offset];
            let alpha = pixels[offset + 1];
            Ok([value, value, value, alpha])
        }
        FileColorDepth::Indexed8 => {
            let index = pixels[pixel_index] as usize;
            if index == 0 {
                return Ok([0, 0, 0, 0]);
            }
            if palette.is_empty() {
                return Err(DecodeError::MissingPaletteForIndexed);
            }
            Ok(palette.colors.get(index).copied().unwrap_or([0, 0, 0, 0]))
        }
    }
}

fn blit_replace(canvas: &mut RgbaImage, dest_x: i32, dest_y: i32, image: &RgbaImage) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            let px = image.get_pixel(x, y);
            if px.0[3] == 0 {
                continue;
            }

            let cx = dest_x + x as i32;
            let cy = dest_y + y as i32;
            if cx < 0 || cy < 0 || cx as u32 >= canvas.width() || cy as u32 >= canvas.height() {
                continue;
            }

            canvas.put_pixel(cx as u32, cy as u32, *px);
        }
    }
}

/// A frame's flattened pixels plus the geometry its texture record
/// needs: the document's original size and the four edge offsets
/// (whitespace trimmed from each side to reach the cropped image).
pub struct FlattenedFrame {
    pub image: RgbaImage,
    pub document_width: u32,
    pub document_height: u32,
    pub offset_left: u32,
    pub offset_top: u32,
    pub offset_right: u32,
    pub offset_bottom: u32,
    pub duration_seconds: f32,
}

/// One cel selected for flattening: its layer index (for back-to-front
/// ordering), document-space position, and pixel payload.
struct SelectedCel<'a> {
    layer_index: u16,
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    pixels: &'a [u8],
}

/// Flattens every frame of `document`. A frame with no selected cels
/// (nothing visible, flattenable, and `Compressed_Image`) or whose cels
/// fall entirely outside the document rectangle produces `None`,
/// matching the "if none, skip the frame" rule.
pub fn flatten_frames(document: &Document) -> Result<Vec<Option<FlattenedFrame>>> {
    let layers = resolve_layers(document);
    let palette = resolve_palette(document);
    let depth = document.header.color_depth;

    let doc_width = i32::from(document.header.width);
    let doc_height = i32::from(document.header.height);
    let doc_rect = Rect::from_coords(0, 0, doc_width, doc_height);

    let mut frame_images = Vec::with_capacity(document.frames.len());

    for frame in &document.frames {
        let mut selected = Vec::new();

        for chunk in &frame.chunks {
            let Chunk::Cel(cel) = chunk else { continue };

            let layer = match layers.get(cel.layer_index as usize) {
                Some(layer) => layer,
                None => {
                    return Err(DecodeError::CelLayerOutOfRange {
                        layer_index: cel.layer_index as usize,
                        layer_count: layers.len(),
                    })
                }
            };
            if !layer.visible || !layer.is_flattenable {
                continue;
            }

            let CelContent::CompressedImage {
                width,
                height,
                pixels,
            } = &cel.content
            else {
                // Raw and Linked cels, and tilemap cels, do not
                // contribute to flattening.
                continue;
            };

            selected.push(SelectedCel {
                layer_index: cel.layer_index,
                x: i32::from(cel.x),
                y: i32::from(cel.y),
                width: *width,
                height: *height,
                pixels,
            });
        }

        if selected.is_empty() {
            frame_images.push(None);
            continue;
        }

        selected.sort_by_key(|cel| cel.layer_index);

        let cels_box = selected
            .iter()
            .map(|cel| Rect::from_coords(cel.x, cel.y, i32::from(cel.width), i32::from(cel.height)))
            .reduce(|a, b| a.union(&b))
            .expect("selected is non-empty");

        let Some(source_rect) = cels_box.intersect(&doc_rect) else {
            // Every selected cel lies entirely outside the document.
            frame_images.push(None);
            continue;
        };

        let mut canvas = RgbaImage::new(
            cels_box.size.width.max(1) as u32,
            cels_box.size.height.max(1) as u32,
        );

        for cel in &selected {
            let mut cel_image =
                RgbaImage::new(u32::from(cel.width).max(1), u32::from(cel.height).max(1));
            for y in 0..cel.height as usize {
                for x in 0..cel.width as usize {
                    let pixel_index = y * cel.width as usize + x;
                    let rgba = pixel_to_rgba(cel.pixels, pixel_index, depth, &palette)?;
                    cel_image.put_pixel(x as u32, y as u32, image::Rgba(rgba));
                }
            }

            blit_replace(
                &mut canvas,
                cel.x - cels_box.left(),
                cel.y - cels_box.top(),
                &cel_image,
            );
        }

        let crop_x = (source_rect.left() - cels_box.left()) as u32;
        let crop_y = (source_rect.top() - cels_box.top()) as u32;
        let image = image::imageops::crop(
            &mut canvas,
            crop_x,
            crop_y,
            source_rect.size.width as u32,
            source_rect.size.height as u32,
        )
        .to_image();

        frame_images.push(Some(FlattenedFrame {
            image,
            document_width: doc_width as u32,
            document_height: doc_height as u32,
            offset_left: source_rect.left() as u32,
            offset_top: source_rect.top() as u32,
            offset_right: (doc_width - source_rect.right()) as u32,
            offset_bottom: (doc_height - source_rect.bottom()) as u32,
            duration_seconds: f32::from(frame.duration_ms) / 1000.0,
        }));
    }

    Ok(frame_images)
}
