#![allow(dead_code)]

use glam::{IVec2, Quat, Vec3};
use zone_editor::scene::{Placement, PlacementEntry};

/// Little-endian byte builder for hand-made format fixtures.
#[derive(Default)]
pub struct Fixture {
    pub bytes: Vec<u8>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn vec2(&mut self, x: f32, y: f32) -> &mut Self {
        self.f32(x).f32(y)
    }

    pub fn vec3(&mut self, value: Vec3) -> &mut Self {
        self.f32(value.x).f32(value.y).f32(value.z)
    }

    pub fn quat(&mut self, value: Quat) -> &mut Self {
        self.f32(value.x).f32(value.y).f32(value.z).f32(value.w)
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn zstring(&mut self, text: &str) -> &mut Self {
        let len = u8::try_from(text.len()).expect("zstring fits in one length byte");
        self.u8(len).raw(text.as_bytes())
    }

    pub fn cstring(&mut self, text: &str) -> &mut Self {
        self.raw(text.as_bytes()).u8(0)
    }

    pub fn var_string(&mut self, text: &str) -> &mut Self {
        let len = text.len();
        if len < 0x80 {
            self.u8(len as u8);
        } else {
            self.u8((len & 0x7f) as u8 | 0x80).u8((len >> 7) as u8);
        }
        self.raw(text.as_bytes())
    }

    /// Overwrites four bytes at `at`; used to patch offsets once a block's position is known.
    pub fn patch_u32(&mut self, at: usize, value: u32) -> &mut Self {
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

/// Writes a block table followed by each block body, patching the absolute offsets.
pub fn block_file(blocks: &[(i32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Fixture::new();
    out.i32(blocks.len() as i32);
    let mut slots = Vec::new();
    for (kind, _) in blocks {
        out.i32(*kind);
        slots.push(out.len());
        out.u32(0);
    }
    for ((_, body), slot) in blocks.iter().zip(slots) {
        let offset = out.len() as u32;
        out.patch_u32(slot, offset);
        out.raw(body);
    }
    out.finish()
}

/// Base placement record as stored in every entry block.
pub fn base_record(out: &mut Fixture, description: &str, object_id: i32, position: Vec3) {
    out.zstring(description)
        .i16(0)
        .i16(7)
        .i32(1)
        .i32(object_id)
        .i32(31)
        .i32(30)
        .quat(Quat::IDENTITY)
        .vec3(position)
        .vec3(Vec3::ONE);
}

/// Entry block body holding plain base records.
pub fn plain_block(entries: &[(&str, i32, Vec3)]) -> Vec<u8> {
    let mut out = Fixture::new();
    out.i32(entries.len() as i32);
    for (description, object_id, position) in entries {
        base_record(&mut out, description, *object_id, *position);
    }
    out.finish()
}

pub fn entry(description: &str, x: f32) -> PlacementEntry {
    PlacementEntry {
        placement: Placement { position: Vec3::new(x, 0.0, 0.0), ..Placement::default() },
        map_cell: IVec2::new(31, 30),
        description: description.to_string(),
        ..PlacementEntry::default()
    }
}
