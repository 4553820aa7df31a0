use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBinding {
    pub slot: u16,
    pub id: u16,
}

/// One row of the character list. Inactive rows are placeholders with empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterEntry {
    pub active: bool,
    pub bone_id: u16,
    pub name: String,
    pub models: Vec<u16>,
    pub motions: Vec<SlotBinding>,
    pub effects: Vec<SlotBinding>,
}

#[derive(Debug, Clone, Default)]
pub struct CharacterDescriptor {
    pub skeletons: Vec<String>,
    pub motions: Vec<String>,
    pub effects: Vec<String>,
    pub characters: Vec<CharacterEntry>,
}

impl CharacterDescriptor {
    pub fn character(&self, id: usize) -> Option<&CharacterEntry> {
        self.characters.get(id).filter(|entry| entry.active)
    }

    pub fn skeleton_path(&self, character: &CharacterEntry) -> Option<&str> {
        self.skeletons.get(character.bone_id as usize).map(String::as_str)
    }

    pub fn motion_path(&self, binding: SlotBinding) -> Option<&str> {
        self.motions.get(binding.id as usize).map(String::as_str)
    }
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<CharacterDescriptor, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    let skeletons = read_names(&mut reader)?;
    let motions = read_names(&mut reader)?;
    let effects = read_names(&mut reader)?;

    let count = reader.read_u16()? as usize;
    let mut characters = Vec::with_capacity(count);
    for _ in 0..count {
        if !reader.read_bool()? {
            characters.push(CharacterEntry::default());
            continue;
        }
        let bone_id = reader.read_u16()?;
        let name = reader.read_cstring()?;
        let model_count = reader.read_u16()? as usize;
        let mut models = Vec::with_capacity(model_count);
        for _ in 0..model_count {
            models.push(reader.read_u16()?);
        }
        let motions = read_bindings(&mut reader)?;
        let effects = read_bindings(&mut reader)?;
        characters.push(CharacterEntry { active: true, bone_id, name, models, motions, effects });
    }

    Ok(CharacterDescriptor { skeletons, motions, effects, characters })
}

fn read_names(reader: &mut ByteReader<'_>) -> Result<Vec<String>, DecodeError> {
    let count = reader.read_u16()? as usize;
    (0..count).map(|_| reader.read_cstring()).collect()
}

fn read_bindings(reader: &mut ByteReader<'_>) -> Result<Vec<SlotBinding>, DecodeError> {
    let count = reader.read_u16()? as usize;
    (0..count).map(|_| Ok(SlotBinding { slot: reader.read_u16()?, id: reader.read_u16()? })).collect()
}
