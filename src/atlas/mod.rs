//! The batch pipeline: walk an input directory, decode every Aseprite
//! source, flatten and extract rectangles, pack them into one atlas
//! image, and emit a metadata catalogue.
//!
//! Deliberately single-threaded and sequential — no worker pool, no
//! `rayon`. Each source is processed to completion before the next
//! begins, so a single bad file can be logged and skipped without
//! disturbing in-flight work on others.

pub mod catalogue;
pub mod flatten;
pub mod glyph;
pub mod pack;
pub mod tiles;

use crate::aseprite::chunk::Chunk;
use crate::aseprite::chunks::tags::LoopDirection;
use crate::aseprite::Document;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use anyhow::Context;
use log::{error, info, warn};
use std::path::Path;
use walkdir::WalkDir;

pub use pack::{PackedRect, RectCategory};

/// A named sequence of already-packed texture frames, derived either
/// from a document's tags chunk or, absent any tags, from its whole
/// frame range.
pub struct AnimationEntry {
    pub name: String,
    pub frame_labels: Vec<String>,
    pub direction: LoopDirection,
    pub repeat_count: u16,
    pub document_width: u32,
    pub document_height: u32,
}

/// Derives the animation records for one source: one entry per tag when
/// the document has tags, otherwise a single entry spanning every frame
/// when there is more than one, otherwise none.
pub fn collect_animations(document: &Document, source_name: &str) -> Vec<AnimationEntry> {
    let document_width = u32::from(document.header.width);
    let document_height = u32::from(document.header.height);

    let tags: Vec<_> = document
        .frames
        .iter()
        .flat_map(|frame| &frame.chunks)
        .filter_map(|chunk| match chunk {
            Chunk::Tags(tags) => Some(&tags.tags),
            _ => None,
        })
        .flatten()
        .collect();

    if !tags.is_empty() {
        return tags
            .iter()
            .map(|tag| AnimationEntry {
                name: format!("{source_name}_{}", tag.name),
                frame_labels: (tag.from_frame..=tag.to_frame)
                    .map(|frame| format!("{source_name}_{frame}"))
                    .collect(),
                direction: tag.direction,
                repeat_count: tag.repeat_count,
                document_width,
                document_height,
            })
            .collect();
    }

    if document.frames.len() > 1 {
        return vec![AnimationEntry {
            name: format!("{source_name}_All"),
            frame_labels: (0..document.frames.len())
                .map(|frame| format!("{source_name}_{frame}"))
                .collect(),
            direction: LoopDirection::Forward,
            repeat_count: 0,
            document_width,
            document_height,
        }];
    }

    Vec::new()
}

/// One sprite/tileset source successfully decoded and ready to
/// contribute rectangles to the atlas.
struct SourceDocument {
    name: String,
    document: Document,
}

fn is_aseprite_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("aseprite") | Some("ase")
    )
}

/// Derives the stable catalogue name for a source file: its file stem,
/// unchanged by directory location, so moving a file between
/// subdirectories never renames its catalogue entry.
fn source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("sprite")
        .to_string()
}

fn load_sources(input_dir: &Path) -> Vec<SourceDocument> {
    let mut sources = Vec::new();

    let mut paths: Vec<_> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_aseprite_file(path))
        .collect();
    // Stable, deterministic iteration order regardless of the
    // filesystem's own directory listing order.
    paths.sort();

    for path in paths {
        let name = source_name(&path);
        match std::fs::read(&path) {
            Ok(bytes) => match Document::decode(&bytes) {
                Ok(document) => {
                    info!("decoded {}", path.display());
                    sources.push(SourceDocument { name, document });
                }
                Err(error) => {
                    error!("failed to decode {}: {error}", path.display());
                }
            },
            Err(error) => {
                error!("failed to read {}: {error}", path.display());
            }
        }
    }

    sources
}

/// Runs the whole pipeline: decode, flatten/extract, pack, emit.
/// Returns the number of rectangles placed in the atlas.
pub fn run(config: &PipelineConfig) -> Result<usize, PipelineError> {
    let sources = load_sources(&config.input_dir);
    if sources.is_empty() {
        return Err(PipelineError::EmptyInputDirectory(
            config.input_dir.display().to_string(),
        ));
    }

    let mut rects: Vec<pack::InputRect> = Vec::new();
    let mut animations: Vec<AnimationEntry> = Vec::new();

    for source in &sources {
        animations.extend(collect_animations(&source.document, &source.name));

        match flatten::flatten_frames(&source.document) {
            Ok(frames) => {
                for (frame_index, flattened) in frames.into_iter().enumerate() {
                    let Some(flattened) = flattened else {
                        continue;
                    };
                    rects.push(pack::InputRect {
                        label: format!("{}_{frame_index}", source.name),
                        category: RectCategory::Texture,
                        image: flattened.image,
                        texture_meta: Some(pack::TextureMeta {
                            document_width: flattened.document_width,
                            document_height: flattened.document_height,
                            offset_left: flattened.offset_left,
                            offset_top: flattened.offset_top,
                            offset_right: flattened.offset_right,
                            offset_bottom: flattened.offset_bottom,
                            duration_seconds: flattened.duration_seconds,
                        }),
                        glyph_meta: None,
                    });
                }
            }
            Err(error) => {
                error!("failed to flatten {}: {error}", source.name);
            }
        }

        match tiles::extract_tiles(&source.document) {
            Ok(extracted) => {
                for (tileset_name, tile_key, image) in extracted {
                    rects.push(pack::InputRect {
                        label: format!("{}_{tileset_name}_tile{tile_key}", source.name),
                        category: RectCategory::Tile,
                        image,
                        texture_meta: None,
                        glyph_meta: None,
                    });
                }
            }
            Err(error) => {
                error!("failed to extract tiles from {}: {error}", source.name);
            }
        }

        for (tileset_name, tile_key, image) in
            tiles::extract_grid_tiles(&source.document, &source.name, config.tile_grid_size)
        {
            rects.push(pack::InputRect {
                label: format!("{tileset_name}_tile{tile_key}"),
                category: RectCategory::Tile,
                image,
                texture_meta: None,
                glyph_meta: None,
            });
        }
    }

    if let Some(font_path) = &config.font_path {
        match glyph::rasterize_glyphs(font_path, &config.codepoints, config.glyph_height_px) {
            Ok(glyphs) => {
                for glyph in glyphs {
                    rects.push(pack::InputRect {
                        label: glyph.catalogue_name(),
                        category: RectCategory::Glyph,
                        image: glyph.image,
                        texture_meta: None,
                        glyph_meta: Some(pack::GlyphMeta {
                            codepoint: glyph.codepoint,
                            offset_x: glyph.offset_x,
                            offset_y: glyph.offset_y,
                            advance_width: glyph.advance_width,
                        }),
                    });
                }
            }
            Err(error) => {
                warn!("failed to rasterize font {}: {error}", font_path.display());
            }
        }
    } else {
        warn!("no font configured, skipping glyph rasterization");
    }

    rects.push(pack::InputRect {
        label: "Swatch".to_string(),
        category: RectCategory::Swatch,
        image: image::RgbaImage::new(1, 1),
        texture_meta: None,
        glyph_meta: None,
    });

    let packed = pack::pack(&rects, config)?;
    let placed = packed.rects.len();

    pack::write_atlas_image(&packed, &config.atlas_output_path)?;
    catalogue::write_catalogue(&packed, &animations, &config.catalogue_output_path)
        .context("writing metadata catalogue")?;

    Ok(placed)
}
