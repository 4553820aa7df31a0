use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;
use std::collections::HashMap;
use std::io::SeekFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringTableKind {
    Text,
    Item,
    Quest,
}

impl StringTableKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "NRST01" => Some(StringTableKind::Text),
            "ITST01" => Some(StringTableKind::Item),
            "QEST01" => Some(StringTableKind::Quest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringKey {
    pub key: String,
    pub id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringEntry {
    pub text: String,
    pub comment: Option<String>,
    pub quest_start: Option<String>,
    pub quest_end: Option<String>,
}

/// Localized strings, one row per key and one column per language.
#[derive(Debug, Clone)]
pub struct StringTable {
    pub kind: StringTableKind,
    pub keys: Vec<StringKey>,
    pub languages: Vec<Vec<StringEntry>>,
    key_index: HashMap<String, usize>,
}

impl StringTable {
    pub fn row_count(&self) -> usize {
        self.keys.len()
    }

    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    pub fn get(&self, row: usize, language: usize) -> Option<&StringEntry> {
        self.languages.get(language)?.get(row)
    }

    pub fn row_of(&self, key: &str) -> Option<usize> {
        self.key_index.get(key).copied()
    }

    pub fn lookup(&self, key: &str, language: usize) -> Option<&StringEntry> {
        self.get(self.row_of(key)?, language)
    }

    pub fn text(&self, key: &str, language: usize) -> Option<&str> {
        self.lookup(key, language).map(|entry| entry.text.as_str())
    }
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<StringTable, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    let tag_offset = reader.offset();
    let tag = reader.read_zstring()?;
    let kind = StringTableKind::from_tag(&tag)
        .ok_or(DecodeError::BadMagic { offset: tag_offset, expected: "NRST01/ITST01/QEST01", found: tag })?;

    let entry_count = reader.read_count("string key")?;
    let mut keys = Vec::with_capacity(entry_count.min(reader.remaining()));
    for _ in 0..entry_count {
        let key = reader.read_var_string()?;
        let id = reader.read_i32()?;
        keys.push(StringKey { key, id });
    }

    let language_count = reader.read_count("language")?;
    let mut language_offsets = Vec::with_capacity(language_count.min(reader.remaining()));
    for _ in 0..language_count {
        language_offsets.push(reader.read_u32()?);
    }

    let mut languages = Vec::with_capacity(language_offsets.len());
    for language_offset in language_offsets {
        reader.seek(SeekFrom::Start(language_offset as u64))?;
        let mut entry_offsets = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            entry_offsets.push(reader.read_u32()?);
        }
        let mut entries = Vec::with_capacity(entry_count);
        for entry_offset in entry_offsets {
            reader.seek(SeekFrom::Start(entry_offset as u64))?;
            let text = reader.read_var_string()?;
            let mut entry = StringEntry { text, ..StringEntry::default() };
            if matches!(kind, StringTableKind::Item | StringTableKind::Quest) {
                entry.comment = Some(reader.read_var_string()?);
            }
            if kind == StringTableKind::Quest {
                entry.quest_start = Some(reader.read_var_string()?);
                entry.quest_end = Some(reader.read_var_string()?);
            }
            entries.push(entry);
        }
        languages.push(entries);
    }

    let key_index = keys.iter().enumerate().map(|(row, key)| (key.key.clone(), row)).collect();
    Ok(StringTable { kind, keys, languages, key_index })
}
