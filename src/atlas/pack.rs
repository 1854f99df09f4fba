//! Rectangle packing: builds one bordered image per input rectangle
//! (the border shape depends on its category), hands the list to the
//! external skyline packer, then composites the results into one atlas
//! image.
//!
//! Rectangle sizes, per category:
//! - **Texture**: source size + 1px transparent seam (right/bottom).
//! - **Glyph**: raster size + 2px transparent margin (1px every side).
//! - **Tile**, no extrusion: tile size + 1px seam, same as textures.
//! - **Tile**, with extrusion: tile size + 1px seam + a 1px ring of
//!   duplicated edge pixels (+3px total), so sampling just past a tile's
//!   edge lands on tile-local color instead of a neighbour tile.
//! - **Swatch**: a fixed 10x10 opaque-white block + 1px seam (11x11).

use crate::config::PipelineConfig;
use crate::error::PackError;
use crate::math::{Point, Rect, Size};
use image::{DynamicImage, RgbaImage};
use log::warn;
use std::path::Path;
use texture_packer::{TexturePacker, TexturePackerConfig};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RectCategory {
    Texture,
    Glyph,
    Tile,
    Swatch,
}

/// Per-texture metadata a Texture record needs beyond its atlas
/// rectangle: the original document size, the whitespace trimmed from
/// each side to reach the packed (cropped) image, and the frame's
/// display duration.
#[derive(Debug, Clone, Copy)]
pub struct TextureMeta {
    pub document_width: u32,
    pub document_height: u32,
    pub offset_left: u32,
    pub offset_top: u32,
    pub offset_right: u32,
    pub offset_bottom: u32,
    pub duration_seconds: f32,
}

/// Per-glyph metadata a Glyph record needs beyond its atlas rectangle.
#[derive(Debug, Clone, Copy)]
pub struct GlyphMeta {
    pub codepoint: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub advance_width: f32,
}

pub struct InputRect {
    pub label: String,
    pub category: RectCategory,
    pub image: RgbaImage,
    pub texture_meta: Option<TextureMeta>,
    pub glyph_meta: Option<GlyphMeta>,
}

/// One rectangle placed in the final atlas. `content_rect` is where the
/// rectangle's actual artwork lives, already adjusted for any margin
/// baked into the packed image and for cropping. `texture_meta`/
/// `glyph_meta` carry the category-specific fields the catalogue
/// emitter needs, set only for the matching `category`.
#[derive(Debug, Clone)]
pub struct PackedRect {
    pub label: String,
    pub category: RectCategory,
    pub content_rect: Rect,
    pub texture_meta: Option<TextureMeta>,
    pub glyph_meta: Option<GlyphMeta>,
}

pub struct PackedAtlas {
    pub image: RgbaImage,
    pub rects: Vec<PackedRect>,
}

/// The packed image plus where its real content sits inside it.
struct BorderedImage {
    image: RgbaImage,
    content_offset: Point,
    content_size: Size,
}

fn extend_canvas(source: &RgbaImage, right: u32, bottom: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(source.width() + right, source.height() + bottom);
    image::imageops::overlay(&mut canvas, source, 0, 0);
    canvas
}

fn build_bordered(rect: &InputRect, extrude: bool) -> BorderedImage {
    match rect.category {
        RectCategory::Texture => BorderedImage {
            image: extend_canvas(&rect.image, 1, 1),
            content_offset: Point::zero(),
            content_size: Size::new(rect.image.width() as i32, rect.image.height() as i32),
        },
        RectCategory::Glyph => {
            let mut canvas = RgbaImage::new(rect.image.width() + 2, rect.image.height() + 2);
            image::imageops::overlay(&mut canvas, &rect.image, 1, 1);
            BorderedImage {
                image: canvas,
                content_offset: Point::new(1, 1),
                content_size: Size::new(rect.image.width() as i32, rect.image.height() as i32),
            }
        }
        RectCategory::Tile if extrude => {
            let w = rect.image.width();
            let h = rect.image.height();
            let mut canvas = RgbaImage::new(w + 3, h + 3);
            image::imageops::overlay(&mut canvas, &rect.image, 1, 1);

            // Duplicate the outermost ring of content pixels one pixel
            // further out so bilinear sampling just past the tile edge
            // reads tile-local color.
            for x in 0..w {
                let top = *rect.image.get_pixel(x, 0);
                let bottom = *rect.image.get_pixel(x, h - 1);
                canvas.put_pixel(x + 1, 0, top);
                canvas.put_pixel(x + 1, h + 1, bottom);
            }
            for y in 0..h {
                let left = *rect.image.get_pixel(0, y);
                let right = *rect.image.get_pixel(w - 1, y);
                canvas.put_pixel(0, y + 1, left);
                canvas.put_pixel(w + 1, y + 1, right);
            }
            canvas.put_pixel(0, 0, *rect.image.get_pixel(0, 0));
            canvas.put_pixel(w + 1, 0, *rect.image.get_pixel(w - 1, 0));
            canvas.put_pixel(0, h + 1, *rect.image.get_pixel(0, h - 1));
            canvas.put_pixel(w + 1, h + 1, *rect.image.get_pixel(w - 1, h - 1));

            BorderedImage {
                image: canvas,
                content_offset: Point::new(1, 1),
                content_size: Size::new(w as i32, h as i32),
            }
        }
        RectCategory::Tile => BorderedImage {
            image: extend_canvas(&rect.image, 1, 1),
            content_offset: Point::zero(),
            content_size: Size::new(rect.image.width() as i32, rect.image.height() as i32),
        },
        RectCategory::Swatch => {
            let mut canvas = RgbaImage::new(11, 11);
            for y in 0..10 {
                for x in 0..10 {
                    canvas.put_pixel(x, y, image::Rgba([255, 255, 255, 255]));
                }
            }
            BorderedImage {
                image: canvas,
                content_offset: Point::zero(),
                content_size: Size::new(10, 10),
            }
        }
    }
}

fn used_bounds(rects: &[PackedRect]) -> Option<Rect> {
    rects
        .iter()
        .map(|r| r.content_rect)
        .reduce(|a, b| a.union(&b))
}

pub fn pack(rects: &[InputRect], config: &PipelineConfig) -> Result<PackedAtlas, PackError> {
    if rects.is_empty() {
        return Err(PackError::NoRectanglesToPack);
    }

    let packer_config = TexturePackerConfig {
        max_width: config.atlas_width,
        max_height: config.atlas_height,
        allow_rotation: false,
        texture_outlines: false,
        border_padding: 0,
        texture_padding: 0,
        texture_extrusion: 0,
        trim: false,
    };

    let mut packer = TexturePacker::new_skyline(packer_config);
    let mut bordered = std::collections::HashMap::new();

    for rect in rects {
        let image = build_bordered(rect, config.extrude_tile_edges);
        let dynamic = DynamicImage::ImageRgba8(image.image.clone());

        if let Err(error) = packer.pack_own(rect.label.clone(), dynamic) {
            warn!("packer could not fit rectangle {}: {error:?}", rect.label);
            continue;
        }

        bordered.insert(
            rect.label.clone(),
            (rect.category, rect.texture_meta, rect.glyph_meta, image),
        );
    }

    let mut canvas = RgbaImage::new(config.atlas_width, config.atlas_height);
    let mut placed = Vec::with_capacity(bordered.len());

    for (label, frame) in packer.get_frames() {
        let Some((category, texture_meta, glyph_meta, image)) = bordered.get(label) else {
            continue;
        };

        let x = frame.frame.x;
        let y = frame.frame.y;
        image::imageops::overlay(&mut canvas, &image.image, i64::from(x), i64::from(y));

        let content_rect = Rect::from_coords(
            x as i32 + image.content_offset.x,
            y as i32 + image.content_offset.y,
            image.content_size.width,
            image.content_size.height,
        );

        placed.push(PackedRect {
            label: label.clone(),
            category: *category,
            content_rect,
            texture_meta: *texture_meta,
            glyph_meta: *glyph_meta,
        });
    }

    // Deterministic, stable ordering for the catalogue emitter.
    placed.sort_by(|a, b| a.label.cmp(&b.label));

    let mut atlas = PackedAtlas {
        image: canvas,
        rects: placed,
    };

    if config.crop_to_used_region {
        if let Some(bounds) = used_bounds(&atlas.rects) {
            let crop_width = (bounds.right() as u32).min(atlas.image.width());
            let crop_height = (bounds.bottom() as u32).min(atlas.image.height());
            atlas.image = image::imageops::crop(&mut atlas.image, 0, 0, crop_width, crop_height)
                .to_image();
            // Crop is always from the bottom-right, so no rect's
            // top-left coordinate moves.
        }
    }

    Ok(atlas)
}

pub fn write_atlas_image(atlas: &PackedAtlas, path: &Path) -> Result<(), PackError> {
    atlas
        .image
        .save(path)
        .map_err(|error| PackError::ImageWriteFailed(error.to_string()))
}
