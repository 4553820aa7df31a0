use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;
use glam::{IVec2, Vec3};
use std::io::SeekFrom;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneInfo {
    pub zone_type: i32,
    pub width: i32,
    pub height: i32,
    pub grid_count: i32,
    pub grid_size: f32,
    pub start_cell: IVec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneTile {
    pub layer1: i32,
    pub layer2: i32,
    pub offset1: i32,
    pub offset2: i32,
    pub blend: i32,
    pub rotation: i32,
    pub tile_type: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneFile {
    pub info: ZoneInfo,
    pub spawn_points: Vec<SpawnPoint>,
    pub textures: Vec<String>,
    pub tiles: Vec<ZoneTile>,
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<ZoneFile, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    let block_count = reader.read_count("block")?;
    let mut table = Vec::with_capacity(block_count.min(reader.remaining()));
    for _ in 0..block_count {
        table.push((reader.read_i32()?, reader.read_u32()?));
    }

    let mut zone = ZoneFile::default();
    for (kind, offset) in table {
        reader.seek(SeekFrom::Start(offset as u64))?;
        match kind {
            0 => {
                zone.info = ZoneInfo {
                    zone_type: reader.read_i32()?,
                    width: reader.read_i32()?,
                    height: reader.read_i32()?,
                    grid_count: reader.read_i32()?,
                    grid_size: reader.read_f32()?,
                    start_cell: reader.read_ivec2()?,
                };
            }
            1 => {
                let count = reader.read_count("spawn point")?;
                for _ in 0..count {
                    let position = reader.read_vec3()?;
                    let name = reader.read_zstring()?;
                    zone.spawn_points.push(SpawnPoint { position, name });
                }
            }
            2 => {
                let count = reader.read_count("tile texture")?;
                for _ in 0..count {
                    zone.textures.push(reader.read_zstring()?);
                }
            }
            3 => {
                let count = reader.read_count("tile")?;
                for _ in 0..count {
                    zone.tiles.push(ZoneTile {
                        layer1: reader.read_i32()?,
                        layer2: reader.read_i32()?,
                        offset1: reader.read_i32()?,
                        offset2: reader.read_i32()?,
                        blend: reader.read_i32()?,
                        rotation: reader.read_i32()?,
                        tile_type: reader.read_i32()?,
                    });
                }
            }
            other => log::debug!("[formats] skipping zone block {other}"),
        }
    }
    Ok(zone)
}
