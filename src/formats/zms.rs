use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;
use crate::scene::Aabb;
use bitflags::bitflags;
use glam::{Vec2, Vec3};

const SKIN_STRIDE: usize = 24;
const TANGENT_STRIDE: usize = 12;
const COLOR_STRIDE: usize = 16;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexFormat: u32 {
        const POSITION = 1 << 1;
        const NORMAL = 1 << 2;
        const COLOR = 1 << 3;
        const BLEND_WEIGHT = 1 << 4;
        const BLEND_INDEX = 1 << 5;
        const TANGENT = 1 << 6;
        const UV1 = 1 << 7;
        const UV2 = 1 << 8;
        const UV3 = 1 << 9;
        const UV4 = 1 << 10;
    }
}

impl VertexFormat {
    pub const SKIN: VertexFormat = VertexFormat::BLEND_WEIGHT.union(VertexFormat::BLEND_INDEX);
    pub const UV_SETS: [VertexFormat; 4] =
        [VertexFormat::UV1, VertexFormat::UV2, VertexFormat::UV3, VertexFormat::UV4];

    pub fn uv_set_count(self) -> usize {
        Self::UV_SETS.iter().filter(|flag| self.contains(**flag)).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv0: Vec2,
    pub uv1: Vec2,
}

#[derive(Debug, Clone)]
pub struct StaticMesh {
    pub format: VertexFormat,
    pub bounds: Aabb,
    pub bones: Vec<i16>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl StaticMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn computed_bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|vertex| vertex.position))
    }
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<StaticMesh, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    reader.expect_magic("ZMS")?;
    let format = VertexFormat::from_bits_truncate(reader.read_u32()?);
    let min = reader.read_vec3()?;
    let max = reader.read_vec3()?;

    let bone_count = reader.read_u16()? as usize;
    let mut bones = Vec::with_capacity(bone_count);
    for _ in 0..bone_count {
        bones.push(reader.read_i16()?);
    }

    let vertex_count = reader.read_u16()? as usize;
    let mut vertices = vec![MeshVertex::default(); vertex_count];
    if format.contains(VertexFormat::POSITION) {
        for vertex in vertices.iter_mut() {
            vertex.position = reader.read_vec3()?;
        }
    }
    if format.contains(VertexFormat::NORMAL) {
        for vertex in vertices.iter_mut() {
            vertex.normal = reader.read_vec3()?;
        }
    }
    if format.contains(VertexFormat::COLOR) {
        reader.skip(COLOR_STRIDE * vertex_count)?;
    }
    if format.contains(VertexFormat::SKIN) {
        reader.skip(SKIN_STRIDE * vertex_count)?;
    }
    if format.contains(VertexFormat::TANGENT) {
        reader.skip(TANGENT_STRIDE * vertex_count)?;
    }
    // Only two texture coordinate fields exist: the first present set fills uv0 and every
    // later set overwrites uv1, so a mesh with three or four sets keeps only the last.
    let mut set_index = 0;
    for flag in VertexFormat::UV_SETS {
        if !format.contains(flag) {
            continue;
        }
        for vertex in vertices.iter_mut() {
            let uv = reader.read_vec2()?;
            if set_index == 0 {
                vertex.uv0 = uv;
            } else {
                vertex.uv1 = uv;
            }
        }
        set_index += 1;
    }

    let face_count = reader.read_u16()? as usize;
    let mut indices = Vec::with_capacity(face_count * 3);
    for _ in 0..face_count * 3 {
        indices.push(reader.read_u16()?);
    }
    if let Some(bad) = indices.iter().find(|index| **index as usize >= vertex_count) {
        return Err(DecodeError::Malformed(format!(
            "triangle index {bad} out of range for {vertex_count} vertices"
        )));
    }

    Ok(StaticMesh { format, bounds: Aabb::new(min, max), bones, vertices, indices })
}
