//! Legacy (`0x0004`/`0x0011`) and modern (`0x2019`) palette chunks.

use crate::io::{Cursor, Result};

/// One packet inside a legacy palette chunk: skip the first `skip_count`
/// palette entries, then overwrite the following `colors.len()` entries.
#[derive(Debug, Clone)]
pub struct LegacyPalettePacket {
    pub skip_count: u8,
    pub colors: Vec<[u8; 3]>,
}

/// `0x0004` (256-color) or `0x0011` (64-color) legacy palette chunk.
/// The 64-color variant stores components in `0..=63`; the caller is
/// responsible for rescaling to 8 bits when resolving pixels.
#[derive(Debug, Clone)]
pub struct LegacyPaletteChunk {
    pub packets: Vec<LegacyPalettePacket>,
}

impl LegacyPaletteChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let packet_count = cursor.read_u16()?;
        let mut packets = Vec::with_capacity(packet_count as usize);

        for _ in 0..packet_count {
            let skip_count = cursor.read_u8()?;
            let mut color_count = cursor.read_u8()? as u16;
            if color_count == 0 {
                color_count = 256;
            }

            let mut colors = Vec::with_capacity(color_count as usize);
            for _ in 0..color_count {
                let r = cursor.read_u8()?;
                let g = cursor.read_u8()?;
                let b = cursor.read_u8()?;
                colors.push([r, g, b]);
            }

            packets.push(LegacyPalettePacket { skip_count, colors });
        }

        Ok(LegacyPaletteChunk { packets })
    }
}

/// One entry in a modern palette chunk.
#[derive(Debug, Clone)]
pub struct PaletteEntry {
    pub color: [u8; 4],
    pub name: Option<String>,
}

/// `0x2019` modern palette chunk.
#[derive(Debug, Clone)]
pub struct PaletteChunk {
    pub new_size: u32,
    pub first_index: u32,
    pub last_index: u32,
    pub entries: Vec<PaletteEntry>,
}

impl PaletteChunk {
    pub fn read(cursor: &mut Cursor) -> Result<Self> {
        let new_size = cursor.read_u32()?;
        let first_index = cursor.read_u32()?;
        let last_index = cursor.read_u32()?;
        cursor.skip(8)?; // reserved

        let count = (last_index - first_index + 1) as usize;
        let mut entries = Vec::with_capacity(count);

        for _ in 0..count {
            let flags = cursor.read_u16()?;
            let r = cursor.read_u8()?;
            let g = cursor.read_u8()?;
            let b = cursor.read_u8()?;
            let a = cursor.read_u8()?;

            let name = if flags & 0x0001 != 0 {
                Some(cursor.read_string()?)
            } else {
                None
            };

            entries.push(PaletteEntry {
                color: [r, g, b, a],
                name,
            });
        }

        Ok(PaletteChunk {
            new_size,
            first_index,
            last_index,
            entries,
        })
    }
}

/// The document's resolved, flat color palette (index -> RGBA).
/// Built incrementally as palette chunks are seen in file order, in
/// exactly the document's chunk order: later chunks overwrite entries
/// earlier ones wrote.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    pub colors: Vec<[u8; 4]>,
}

impl Palette {
    fn ensure_len(&mut self, len: usize) {
        if self.colors.len() < len {
            self.colors.resize(len, [0, 0, 0, 0]);
        }
    }

    pub fn apply_legacy(&mut self, chunk: &LegacyPaletteChunk, is_64_level: bool) {
        let mut index = 0usize;

        for packet in &chunk.packets {
            index += packet.skip_count as usize;
            self.ensure_len(index + packet.colors.len());

            for &[r, g, b] in &packet.colors {
                let scale = |component: u8| -> u8 {
                    if is_64_level {
                        ((component as u32 * 255) / 63) as u8
                    } else {
                        component
                    }
                };

                self.colors[index] = [scale(r), scale(g), scale(b), 255];
                index += 1;
            }
        }
    }

    pub fn apply_modern(&mut self, chunk: &PaletteChunk) {
        self.ensure_len(chunk.new_size as usize);
        self.ensure_len(chunk.last_index as usize + 1);

        for (offset, entry) in chunk.entries.iter().enumerate() {
            self.colors[chunk.first_index as usize + offset] = entry.color;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn modern_palette_overwrites_range() {
        let mut palette = Palette::default();
        let chunk = PaletteChunk {
            new_size: 2,
            first_index: 0,
            last_index: 1,
            entries: vec![
                PaletteEntry {
                    color: [0, 0, 0, 0],
                    name: None,
                },
                PaletteEntry {
                    color: [255, 0, 0, 255],
                    name: None,
                },
            ],
        };

        palette.apply_modern(&chunk);
        assert_eq!(palette.colors, vec![[0, 0, 0, 0], [255, 0, 0, 255]]);
    }

    #[test]
    fn legacy_64_level_rescales_to_8_bit() {
        let mut palette = Palette::default();
        let chunk = LegacyPaletteChunk {
            packets: vec![LegacyPalettePacket {
                skip_count: 0,
                colors: vec![[63, 0, 0]],
            }],
        };

        palette.apply_legacy(&chunk, true);
        assert_eq!(palette.colors[0], [255, 0, 0, 255]);
    }
}
