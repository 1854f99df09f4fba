//! TrueType glyph rasterization via `rusttype`.
//!
//! Each requested codepoint is rasterized to an 8-bit alpha bitmap, then
//! promoted to white RGBA (`[255, 255, 255, alpha]`) so glyphs composite
//! the same way textures and tiles do once packed into the atlas — a
//! renderer tints them at draw time rather than the pipeline baking in a
//! color.

use crate::error::DecodeError;
use crate::io::Result;
use image::RgbaImage;
use rusttype::{Font, Point, Scale};
use std::path::Path;

pub struct RasterizedGlyph {
    pub codepoint: u32,
    pub image: RgbaImage,
    pub advance_width: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl RasterizedGlyph {
    /// Stable catalogue name: `Glyph_<codepoint>`, zero-padded to four
    /// hex digits so entries sort the same way they're addressed.
    pub fn catalogue_name(&self) -> String {
        format!("Glyph_{:04X}", self.codepoint)
    }
}

pub fn rasterize_glyphs(
    font_path: &Path,
    codepoints: &[u32],
    pixel_height: u32,
) -> Result<Vec<RasterizedGlyph>> {
    let font_bytes = std::fs::read(font_path)?;
    let font = Font::try_from_vec(font_bytes)
        .ok_or_else(|| DecodeError::not_supported(format!("invalid font file {}", font_path.display())))?;

    let scale = Scale::uniform(pixel_height as f32);
    let v_metrics = font.v_metrics(scale);
    let offset = Point {
        x: 0.0,
        y: v_metrics.ascent,
    };

    let mut glyphs = Vec::with_capacity(codepoints.len());

    for &codepoint in codepoints {
        let character = match char::from_u32(codepoint) {
            Some(character) => character,
            None => continue,
        };

        let glyph = font.glyph(character).scaled(scale).positioned(offset);
        let advance_width = font.glyph(character).scaled(scale).h_metrics().advance_width;

        let Some(bounds) = glyph.pixel_bounding_box() else {
            // No visible pixels (e.g. space) — still a valid glyph with
            // zero-sized artwork and a real advance width.
            glyphs.push(RasterizedGlyph {
                codepoint,
                image: RgbaImage::new(1, 1),
                advance_width,
                offset_x: 0.0,
                offset_y: 0.0,
            });
            continue;
        };

        let width = (bounds.max.x - bounds.min.x).max(1) as u32;
        let height = (bounds.max.y - bounds.min.y).max(1) as u32;
        let mut image = RgbaImage::new(width, height);

        glyph.draw(|x, y, coverage| {
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            if x < width && y < height {
                image.put_pixel(x, y, image::Rgba([255, 255, 255, alpha]));
            }
        });

        glyphs.push(RasterizedGlyph {
            codepoint,
            image,
            advance_width,
            offset_x: bounds.min.x as f32,
            offset_y: bounds.min.y as f32,
        });
    }

    Ok(glyphs)
}
