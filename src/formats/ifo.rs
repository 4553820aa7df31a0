use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;
use crate::scene::{Category, EntryOrigin, MonsterSpawn, Placement, PlacementEntry, PlacementExtra, SpawnTuple};
use std::io::SeekFrom;

const BLOCK_MAP_INFO: i32 = 0;
const BLOCK_WATER_PATCHES: i32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementBlock {
    pub category: Category,
    pub entries: Vec<PlacementEntry>,
}

/// Decoded placement file for one map cell. Holds at most one block per category.
#[derive(Debug, Clone, Default)]
pub struct PlacementFile {
    pub blocks: Vec<PlacementBlock>,
    pub water_width: f32,
    pub skipped_blocks: Vec<i32>,
}

impl PlacementFile {
    pub fn entries(&self, category: Category) -> &[PlacementEntry] {
        self.blocks
            .iter()
            .find(|block| block.category == category)
            .map(|block| block.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry_count(&self) -> usize {
        self.blocks.iter().map(|block| block.entries.len()).sum()
    }
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<PlacementFile, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    let block_count = reader.read_count("block")?;
    let mut table = Vec::with_capacity(block_count.min(reader.remaining()));
    for _ in 0..block_count {
        let kind = reader.read_i32()?;
        let offset = reader.read_u32()?;
        table.push((kind, offset));
    }

    let mut file = PlacementFile::default();
    for (kind, offset) in table {
        let Some(category) = Category::from_block(kind) else {
            if kind != BLOCK_MAP_INFO && kind != BLOCK_WATER_PATCHES {
                log::debug!("[formats] skipping unknown placement block {kind}");
            }
            file.skipped_blocks.push(kind);
            continue;
        };
        reader.seek(SeekFrom::Start(offset as u64))?;
        let entries = if category == Category::Water {
            let (width, planes) = read_water_planes(&mut reader)?;
            file.water_width = width;
            planes
        } else {
            let count = reader.read_count("placement entry")?;
            let mut entries = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                let mut entry = read_base(&mut reader)?;
                entry.extra = read_extra(&mut reader, category)?;
                entries.push(entry);
            }
            entries
        };
        // A category listed twice in the table continues its first block.
        let block = match file.blocks.iter().position(|block| block.category == category) {
            Some(existing) => {
                log::debug!("[formats] placement block {kind} repeats; appending to the first");
                &mut file.blocks[existing]
            }
            None => {
                file.blocks.push(PlacementBlock { category, entries: Vec::new() });
                let last = file.blocks.len() - 1;
                &mut file.blocks[last]
            }
        };
        for mut entry in entries {
            entry.origin = EntryOrigin { file: 0, local: block.entries.len() };
            block.entries.push(entry);
        }
    }
    Ok(file)
}

fn read_base(reader: &mut ByteReader<'_>) -> Result<PlacementEntry, DecodeError> {
    let description = reader.read_zstring()?;
    let warp_id = reader.read_i16()?;
    let event_id = reader.read_i16()?;
    let object_type = reader.read_i32()?;
    let object_id = reader.read_i32()?;
    let map_cell = reader.read_ivec2()?;
    let rotation = reader.read_quat()?;
    let position = reader.read_vec3()?;
    let scale = reader.read_vec3()?;
    Ok(PlacementEntry {
        placement: Placement { position, rotation, scale },
        map_cell,
        object_type,
        object_id,
        description,
        warp_id,
        event_id,
        extra: PlacementExtra::None,
        origin: EntryOrigin::default(),
    })
}

fn read_extra(reader: &mut ByteReader<'_>, category: Category) -> Result<PlacementExtra, DecodeError> {
    let extra = match category {
        Category::Npc => {
            PlacementExtra::Npc { ai_pattern: reader.read_i32()?, quest_file: reader.read_zstring()? }
        }
        Category::Sound => PlacementExtra::Sound {
            path: reader.read_zstring()?,
            range: reader.read_i32()?,
            interval: reader.read_i32()?,
        },
        Category::Effect => PlacementExtra::Effect { path: reader.read_zstring()? },
        Category::Monster => {
            let name = reader.read_zstring()?;
            let basic = read_spawn_tuples(reader)?;
            let tactic = read_spawn_tuples(reader)?;
            PlacementExtra::Monster(MonsterSpawn {
                name,
                basic,
                tactic,
                interval: reader.read_i32()?,
                limit: reader.read_i32()?,
                range: reader.read_i32()?,
                tactic_points: reader.read_i32()?,
            })
        }
        Category::EventTrigger => {
            PlacementExtra::Event { function: reader.read_zstring()?, conversation: reader.read_zstring()? }
        }
        _ => PlacementExtra::None,
    };
    Ok(extra)
}

fn read_spawn_tuples(reader: &mut ByteReader<'_>) -> Result<Vec<SpawnTuple>, DecodeError> {
    let count = reader.read_count("spawn tuple")?;
    let mut tuples = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        tuples.push(SpawnTuple {
            description: reader.read_zstring()?,
            monster_id: reader.read_i32()?,
            count: reader.read_i32()?,
        });
    }
    Ok(tuples)
}

fn read_water_planes(reader: &mut ByteReader<'_>) -> Result<(f32, Vec<PlacementEntry>), DecodeError> {
    let width = reader.read_f32()?;
    let count = reader.read_count("water plane")?;
    let mut planes = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let min = reader.read_vec3()?;
        let max = reader.read_vec3()?;
        planes.push(PlacementEntry::water(min, max));
    }
    Ok((width, planes))
}
