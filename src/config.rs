//! Pipeline configuration, populated from CLI arguments in
//! `bin/aseatlas.rs` but kept independent of `clap` so it can also be
//! constructed directly in tests.

use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Default printable ASCII range: space through tilde.
const DEFAULT_CODEPOINTS: RangeInclusive<u32> = 0x20..=0x7E;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub atlas_output_path: PathBuf,
    pub catalogue_output_path: PathBuf,

    pub atlas_width: u32,
    pub atlas_height: u32,
    /// Crop the atlas image down to its used region after packing.
    pub crop_to_used_region: bool,
    /// Duplicate each tile's border pixels outward by one pixel, to
    /// avoid bleeding when the atlas is sampled with bilinear filtering.
    pub extrude_tile_edges: bool,
    /// Fixed tile size used by the filename-based grid extractor (`W`).
    pub tile_grid_size: u32,

    pub font_path: Option<PathBuf>,
    pub codepoints: Vec<u32>,
    pub glyph_height_px: u32,
}

impl PipelineConfig {
    pub fn new(input_dir: PathBuf, atlas_output_path: PathBuf, catalogue_output_path: PathBuf) -> Self {
        Self {
            input_dir,
            atlas_output_path,
            catalogue_output_path,
            atlas_width: 2048,
            atlas_height: 2048,
            crop_to_used_region: true,
            extrude_tile_edges: true,
            tile_grid_size: 10,
            font_path: None,
            codepoints: DEFAULT_CODEPOINTS.collect(),
            glyph_height_px: 16,
        }
    }
}
