//! Command-line entry point: parses arguments, initializes logging, and
//! runs the pipeline once.

use aseatlas::config::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Builds a sprite and font texture atlas plus metadata catalogue from a
/// directory of Aseprite source files.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory to scan for `.aseprite`/`.ase` sources.
    input_dir: PathBuf,

    /// Where to write the packed atlas PNG.
    #[arg(long, default_value = "atlas.png")]
    atlas_output: PathBuf,

    /// Where to write the generated Rust metadata catalogue.
    #[arg(long, default_value = "atlas_catalogue.rs")]
    catalogue_output: PathBuf,

    #[arg(long, default_value_t = 2048)]
    atlas_width: u32,

    #[arg(long, default_value_t = 2048)]
    atlas_height: u32,

    #[arg(long, default_value_t = true)]
    crop: bool,

    #[arg(long, default_value_t = true)]
    extrude_tiles: bool,

    #[arg(long, default_value_t = 10)]
    tile_grid_size: u32,

    /// TrueType font to rasterize glyphs from. Glyph rasterization is
    /// skipped entirely when this is omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long, default_value_t = 16)]
    glyph_height: u32,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let mut config =
            PipelineConfig::new(self.input_dir, self.atlas_output, self.catalogue_output);
        config.atlas_width = self.atlas_width;
        config.atlas_height = self.atlas_height;
        config.crop_to_used_region = self.crop;
        config.extrude_tile_edges = self.extrude_tiles;
        config.tile_grid_size = self.tile_grid_size;
        config.font_path = self.font;
        config.glyph_height_px = self.glyph_height;
        config
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let config = Args::parse().into_config();

    match aseatlas::atlas::run(&config) {
        Ok(placed) => {
            log::info!("wrote atlas with {placed} rectangles");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("pipeline failed: {error}");
            ExitCode::FAILURE
        }
    }
}
