//! Metadata catalogue emitter.
//!
//! Writes a generated Rust source file enumerating, in stable order: a
//! symbolic constant per texture frame, animation tags, a tile table
//! keyed by tileset and grid position, glyph records, and the swatch
//! rectangle. Names are derived from each rectangle's label by
//! converting it to PascalCase. The emitter's only contract is stable
//! keys, stable ordering, and zero forward references between records —
//! the generated syntax itself is not part of any external interface.

use crate::aseprite::chunks::tags::LoopDirection;
use crate::atlas::pack::{PackedAtlas, RectCategory};
use crate::atlas::AnimationEntry;
use crate::error::CatalogueError;
use std::fmt::Write as _;
use std::path::Path;

fn direction_variant(direction: LoopDirection) -> &'static str {
    match direction {
        LoopDirection::Forward => "Forward",
        LoopDirection::Reverse => "Reverse",
        LoopDirection::PingPong => "PingPong",
        LoopDirection::PingPongReverse => "PingPongReverse",
    }
}

/// Converts a `snake_case`/`kebab-case`/mixed label into `PascalCase`,
/// splitting on any run of non-alphanumeric characters.
fn to_pascal_case(label: &str) -> String {
    let mut result = String::with_capacity(label.len());
    let mut capitalize_next = true;

    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if capitalize_next {
                result.extend(ch.to_uppercase());
                capitalize_next = false;
            } else {
                result.push(ch);
            }
        } else {
            capitalize_next = true;
        }
    }

    result
}

fn emit_rect_constant(out: &mut String, const_name: &str, rect: &crate::math::Rect) {
    let _ = writeln!(
        out,
        "pub const {const_name}: AtlasRect = AtlasRect {{ x: {x}, y: {y}, width: {w}, height: {h} }};",
        x = rect.position.x,
        y = rect.position.y,
        w = rect.size.width,
        h = rect.size.height,
    );
}

fn emit_texture_constant(
    out: &mut String,
    const_name: &str,
    rect: &crate::math::Rect,
    meta: &crate::atlas::pack::TextureMeta,
) {
    let _ = writeln!(
        out,
        "pub const {const_name}: TextureRecord = TextureRecord {{ rect: AtlasRect {{ x: {x}, y: {y}, width: {w}, height: {h} }}, document_width: {dw}, document_height: {dh}, offset_left: {ol}, offset_top: {ot}, offset_right: {or_}, offset_bottom: {ob}, duration_seconds: {dur}f32 }};",
        x = rect.position.x,
        y = rect.position.y,
        w = rect.size.width,
        h = rect.size.height,
        dw = meta.document_width,
        dh = meta.document_height,
        ol = meta.offset_left,
        ot = meta.offset_top,
        or_ = meta.offset_right,
        ob = meta.offset_bottom,
        dur = meta.duration_seconds,
    );
}

fn emit_glyph_constant(
    out: &mut String,
    const_name: &str,
    rect: &crate::math::Rect,
    meta: &crate::atlas::pack::GlyphMeta,
) {
    let _ = writeln!(
        out,
        "pub const {const_name}: GlyphRecord = GlyphRecord {{ rect: AtlasRect {{ x: {x}, y: {y}, width: {w}, height: {h} }}, codepoint: {cp}, offset_x: {ox}f32, offset_y: {oy}f32, advance_width: {aw}f32 }};",
        x = rect.position.x,
        y = rect.position.y,
        w = rect.size.width,
        h = rect.size.height,
        cp = meta.codepoint,
        ox = meta.offset_x,
        oy = meta.offset_y,
        aw = meta.advance_width,
    );
}

pub fn write_catalogue(
    atlas: &PackedAtlas,
    animations: &[AnimationEntry],
    path: &Path,
) -> Result<(), CatalogueError> {
    let mut out = String::new();

    out.push_str("// Generated by the atlas build pipeline. Do not edit by hand.\n\n");
    out.push_str("#[derive(Debug, Clone, Copy)]\npub struct AtlasRect { pub x: i32, pub y: i32, pub width: i32, pub height: i32 }\n\n");
    out.push_str("#[derive(Debug, Clone, Copy)]\npub struct TextureRecord { pub rect: AtlasRect, pub document_width: u32, pub document_height: u32, pub offset_left: u32, pub offset_top: u32, pub offset_right: u32, pub offset_bottom: u32, pub duration_seconds: f32 }\n\n");
    out.push_str("#[derive(Debug, Clone, Copy)]\npub struct GlyphRecord { pub rect: AtlasRect, pub codepoint: u32, pub offset_x: f32, pub offset_y: f32, pub advance_width: f32 }\n\n");
    out.push_str("#[derive(Debug, Clone, Copy, Eq, PartialEq)]\npub enum LoopDirection { Forward, Reverse, PingPong, PingPongReverse }\n\n");
    out.push_str("#[derive(Debug, Clone, Copy)]\npub struct Animation { pub frames: &'static [TextureRecord], pub direction: LoopDirection, pub repeat_count: u16, pub document_width: u32, pub document_height: u32 }\n\n");

    let mut textures: Vec<_> = atlas
        .rects
        .iter()
        .filter(|r| r.category == RectCategory::Texture)
        .collect();
    textures.sort_by(|a, b| a.label.cmp(&b.label));

    let mut tiles: Vec<_> = atlas
        .rects
        .iter()
        .filter(|r| r.category == RectCategory::Tile)
        .collect();
    tiles.sort_by(|a, b| a.label.cmp(&b.label));

    let mut glyphs: Vec<_> = atlas
        .rects
        .iter()
        .filter(|r| r.category == RectCategory::Glyph)
        .collect();
    glyphs.sort_by(|a, b| a.label.cmp(&b.label));

    out.push_str("pub mod textures {\n");
    out.push_str("    use super::{AtlasRect, TextureRecord};\n\n");
    for rect in &textures {
        let Some(meta) = rect.texture_meta.as_ref() else {
            continue;
        };
        let mut block = String::new();
        emit_texture_constant(&mut block, &to_pascal_case(&rect.label), &rect.content_rect, meta);
        for line in block.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("}\n\n");

    out.push_str("pub mod animations {\n");
    out.push_str("    use super::{Animation, LoopDirection};\n\n");
    let mut sorted_animations: Vec<_> = animations.iter().collect();
    sorted_animations.sort_by(|a, b| a.name.cmp(&b.name));
    for animation in &sorted_animations {
        let frame_refs: Vec<String> = animation
            .frame_labels
            .iter()
            .map(|label| format!("super::textures::{}", to_pascal_case(label)))
            .collect();
        let _ = writeln!(
            out,
            "    pub const {}: Animation = Animation {{ frames: &[{}], direction: LoopDirection::{}, repeat_count: {}, document_width: {}, document_height: {} }};",
            to_pascal_case(&animation.name),
            frame_refs.join(", "),
            direction_variant(animation.direction),
            animation.repeat_count,
            animation.document_width,
            animation.document_height,
        );
    }
    out.push_str("}\n\n");

    out.push_str("pub mod tiles {\n");
    out.push_str("    use super::AtlasRect;\n\n");
    for rect in &tiles {
        let mut block = String::new();
        emit_rect_constant(&mut block, &to_pascal_case(&rect.label), &rect.content_rect);
        for line in block.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("}\n\n");

    out.push_str("pub mod glyphs {\n");
    out.push_str("    use super::{AtlasRect, GlyphRecord};\n\n");
    for rect in &glyphs {
        let Some(meta) = rect.glyph_meta.as_ref() else {
            continue;
        };
        let mut block = String::new();
        emit_glyph_constant(&mut block, &to_pascal_case(&rect.label), &rect.content_rect, meta);
        for line in block.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("}\n\n");

    if let Some(swatch) = atlas
        .rects
        .iter()
        .find(|r| r.category == RectCategory::Swatch)
    {
        emit_rect_constant(&mut out, "SWATCH", &swatch.content_rect);
    }

    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pascal_case_splits_on_separators() {
        assert_eq!(to_pascal_case("hero_walk_0"), "HeroWalk0");
        assert_eq!(to_pascal_case("tileset-forest"), "TilesetForest");
        assert_eq!(to_pascal_case("Glyph_0041"), "Glyph0041");
    }
}
