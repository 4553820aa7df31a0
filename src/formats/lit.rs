use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightmapPart {
    pub name: String,
    pub part_id: i32,
    pub file: String,
    pub lightmap_index: i32,
    pub pixels_per_part: i32,
    pub parts_per_width: i32,
    pub part_position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightmapObject {
    /// Position of the object inside its placement block, starting at 1.
    pub object_id: i32,
    pub parts: Vec<LightmapPart>,
}

#[derive(Debug, Clone, Default)]
pub struct LightmapFile {
    pub objects: Vec<LightmapObject>,
    pub files: Vec<String>,
}

impl LightmapFile {
    pub fn parts_for(&self, local: usize) -> Option<&[LightmapPart]> {
        let object_id = i32::try_from(local + 1).ok()?;
        self.objects.iter().find(|object| object.object_id == object_id).map(|object| object.parts.as_slice())
    }
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<LightmapFile, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    let object_count = reader.read_count("lightmap object")?;
    let mut objects = Vec::with_capacity(object_count.min(reader.remaining()));
    for _ in 0..object_count {
        let part_count = reader.read_count("lightmap part")?;
        let object_id = reader.read_i32()?;
        let mut parts = Vec::with_capacity(part_count.min(reader.remaining()));
        for _ in 0..part_count {
            parts.push(LightmapPart {
                name: reader.read_zstring()?,
                part_id: reader.read_i32()?,
                file: reader.read_zstring()?,
                lightmap_index: reader.read_i32()?,
                pixels_per_part: reader.read_i32()?,
                parts_per_width: reader.read_i32()?,
                part_position: reader.read_i32()?,
            });
        }
        objects.push(LightmapObject { object_id, parts });
    }
    let file_count = reader.read_count("lightmap file")?;
    let files = (0..file_count).map(|_| reader.read_zstring()).collect::<Result<Vec<_>, _>>()?;
    Ok(LightmapFile { objects, files })
}
