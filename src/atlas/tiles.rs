//! Tile extraction.
//!
//! Two independent mechanisms feed the packer:
//!
//! - The filename-based grid extractor: a source whose name starts with
//!   `tileset` is treated as a single-frame tile grid. Its first
//!   `Compressed_Image` cel is sliced into a fixed `tile_grid_size`
//!   square grid.
//! - The `0x2023` tileset chunk extractor: any document carrying a real
//!   tileset chunk has its declared tiles sliced out directly, using the
//!   chunk's own tile dimensions rather than a filename convention.
//!
//! Both discard tiles whose pixels are all fully transparent, since an
//! empty tile carries no visual information and only wastes atlas space.

use crate::aseprite::chunk::Chunk;
use crate::aseprite::chunks::cel::CelContent;
use crate::aseprite::Document;
use crate::error::DecodeError;
use crate::io::Result;
use image::RgbaImage;

fn is_fully_transparent(image: &RgbaImage) -> bool {
    image.pixels().all(|pixel| pixel.0[3] == 0)
}

fn slice_grid(source: &RgbaImage, tile_size: u32) -> Vec<(u32, u32, RgbaImage)> {
    if tile_size == 0 {
        return Vec::new();
    }

    let columns = source.width() / tile_size;
    let rows = source.height() / tile_size;
    let mut tiles = Vec::with_capacity((columns * rows) as usize);

    for grid_y in 0..rows {
        for grid_x in 0..columns {
            let mut tile = RgbaImage::new(tile_size, tile_size);
            for y in 0..tile_size {
                for x in 0..tile_size {
                    let px = source.get_pixel(grid_x * tile_size + x, grid_y * tile_size + y);
                    tile.put_pixel(x, y, *px);
                }
            }

            if is_fully_transparent(&tile) {
                continue;
            }

            tiles.push((grid_x, grid_y, tile));
        }
    }

    tiles
}

fn first_compressed_image_cel(document: &Document) -> Option<RgbaImage> {
    let depth = document.header.color_depth;
    let frame = document.frames.first()?;

    for chunk in &frame.chunks {
        let Chunk::Cel(cel) = chunk else { continue };
        let CelContent::CompressedImage {
            width,
            height,
            pixels,
        } = &cel.content
        else {
            continue;
        };

        let mut image = RgbaImage::new(u32::from(*width).max(1), u32::from(*height).max(1));
        let bpp = match depth {
            crate::aseprite::FileColorDepth::Rgba32 => 4,
            crate::aseprite::FileColorDepth::Grayscale16 => 2,
            crate::aseprite::FileColorDepth::Indexed8 => 1,
        };

        for y in 0..*height as u32 {
            for x in 0..*width as u32 {
                let offset = (y as usize * *width as usize + x as usize) * bpp;
                let rgba = match depth {
                    crate::aseprite::FileColorDepth::Rgba32 => [
                        pixels[offset],
                        pixels[offset + 1],
                        pixels[offset + 2],
                        pixels[offset + 3],
                    ],
                    crate::aseprite::FileColorDepth::Grayscale16 => {
                        let v = pixels[offset];
                        [v, v, v, pixels[offset + 1]]
                    }
                    // Indexed grid sources are uncommon in practice; without a
                    // resolved palette here we can only preserve the raw index
                    // as grayscale rather than drop the source entirely.
                    crate::aseprite::FileColorDepth::Indexed8 => {
                        let v = pixels[offset];
                        [v, v, v, if v == 0 { 0 } else { 255 }]
                    }
                };
                image.put_pixel(x, y, image::Rgba(rgba));
            }
        }

        return Some(image);
    }

    None
}

/// Returns `(tileset_name, "x_y" or tile index label, image)` tuples for
/// every non-empty tile produced by either extraction mechanism.
pub fn extract_tiles(document: &Document) -> Result<Vec<(String, String, RgbaImage)>> {
    let external_files = document
        .frames
        .iter()
        .flat_map(|frame| &frame.chunks)
        .find_map(|chunk| match chunk {
            Chunk::ExternalFiles(chunk) => Some(chunk),
            _ => None,
        });

    let mut tiles = Vec::new();

    for frame in &document.frames {
        for chunk in &frame.chunks {
            let Chunk::Tileset(tileset) = chunk else {
                continue;
            };

            let Some((sheet_width, _sheet_height, pixels)) = &tileset.image else {
                // No embedded sheet. A tileset that names an external file
                // instead can't be reconstructed without loading that file,
                // which this pipeline doesn't resolve; anything else means
                // a tileset with neither embedded nor external pixels,
                // which is just empty.
                if let Some(external) = &tileset.external {
                    let file_name = external_files
                        .and_then(|chunk| chunk.resolve(external.file_id))
                        .unwrap_or("<unknown file>");
                    return Err(DecodeError::not_supported(format!(
                        "tileset {:?} references external file {file_name:?}, which this pipeline does not load",
                        tileset.name
                    )));
                }
                continue;
            };

            let tile_width = u32::from(tileset.tile_width);
            let tile_height = u32::from(tileset.tile_height);
            if tile_width == 0 || tile_height == 0 {
                continue;
            }

            for tile_index in 0..tileset.tile_count {
                let mut tile_image = RgbaImage::new(tile_width, tile_height);
                let row_offset = tile_index * tile_height;

                for y in 0..tile_height {
                    for x in 0..tile_width {
                        let src_y = row_offset + y;
                        let pixel_index = (src_y * u32::from(*sheet_width) + x) as usize * 4;

                        if pixel_index + 4 > pixels.len() {
                            continue;
                        }

                        let rgba = [
                            pixels[pixel_index],
                            pixels[pixel_index + 1],
                            pixels[pixel_index + 2],
                            pixels[pixel_index + 3],
                        ];
                        tile_image.put_pixel(x, y, image::Rgba(rgba));
                    }
                }

                if is_fully_transparent(&tile_image) {
                    continue;
                }

                tiles.push((tileset.name.clone(), tile_index.to_string(), tile_image));
            }
        }
    }

    Ok(tiles)
}

/// The filename-based grid extractor. `source_name` is the document's
/// catalogue name (file stem); only names starting with `tileset`
/// trigger grid slicing.
pub fn extract_grid_tiles(
    document: &Document,
    source_name: &str,
    tile_size: u32,
) -> Vec<(String, String, RgbaImage)> {
    if !source_name.starts_with("tileset") {
        return Vec::new();
    }

    let Some(grid_source) = first_compressed_image_cel(document) else {
        return Vec::new();
    };

    slice_grid(&grid_source, tile_size)
        .into_iter()
        .map(|(x, y, image)| (source_name.to_string(), format!("{x}_{y}"), image))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_extractor_ignores_non_tileset_names() {
        let document = Document {
            header: crate::aseprite::FileHeader {
                frame_count: 0,
                width: 0,
                height: 0,
                color_depth: crate::aseprite::FileColorDepth::Rgba32,
                flags: crate::aseprite::FileFlags::empty(),
                default_frame_duration_ms: 0,
                transparent_index: 0,
                palette_size: 0,
                pixel_aspect_ratio: (1, 1),
                grid: None,
            },
            frames: Vec::new(),
        };

        assert!(extract_grid_tiles(&document, "hero_walk", 10).is_empty());
    }

    #[test]
    fn slice_grid_discards_transparent_tiles() {
        let mut source = RgbaImage::new(20, 10);
        for x in 10..20 {
            for y in 0..10 {
                source.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
            }
        }

        let tiles = slice_grid(&source, 10);
        assert_eq!(tiles.len(), 1);
        assert_eq!((tiles[0].0, tiles[0].1), (1, 0));
    }
}
