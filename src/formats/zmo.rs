use super::reader::{ByteReader, TextEncoding};
use crate::error::DecodeError;
use bitflags::bitflags;
use glam::{Quat, Vec2, Vec3};

pub const CAMERA_OFFSET: Vec3 = Vec3::new(5200.0, 5200.0, 0.0);
pub const CAMERA_DIVISOR: f32 = 100.0;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelFlags: u32 {
        const POSITION = 1 << 1;
        const ROTATION = 1 << 2;
        const NORMAL = 1 << 3;
        const ALPHA = 1 << 4;
        const UV1 = 1 << 5;
        const UV2 = 1 << 6;
        const UV3 = 1 << 7;
        const UV4 = 1 << 8;
        const TEXTURE_ANIM = 1 << 9;
        const SCALE = 1 << 10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Position,
    Rotation,
    Normal,
    Alpha,
    Uv(u8),
    TextureAnim,
    Scale,
}

const CHANNEL_KINDS: [(ChannelFlags, ChannelKind); 10] = [
    (ChannelFlags::POSITION, ChannelKind::Position),
    (ChannelFlags::ROTATION, ChannelKind::Rotation),
    (ChannelFlags::NORMAL, ChannelKind::Normal),
    (ChannelFlags::ALPHA, ChannelKind::Alpha),
    (ChannelFlags::UV1, ChannelKind::Uv(0)),
    (ChannelFlags::UV2, ChannelKind::Uv(1)),
    (ChannelFlags::UV3, ChannelKind::Uv(2)),
    (ChannelFlags::UV4, ChannelKind::Uv(3)),
    (ChannelFlags::TEXTURE_ANIM, ChannelKind::TextureAnim),
    (ChannelFlags::SCALE, ChannelKind::Scale),
];

impl ChannelKind {
    /// A channel carries exactly one known flag; any other tag is rejected.
    pub fn from_tag(tag: u32) -> Option<Self> {
        CHANNEL_KINDS.iter().find(|(flag, _)| flag.bits() == tag).map(|(_, kind)| *kind)
    }

    pub fn flag(self) -> ChannelFlags {
        CHANNEL_KINDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(flag, _)| *flag)
            .unwrap_or(ChannelFlags::empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub kind: ChannelKind,
    pub bone: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Position(Vec3),
    Rotation(Quat),
    Normal(Vec3),
    Alpha(f32),
    Uv(Vec2),
    TextureAnim(f32),
    Scale(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// One value per channel, in channel order.
    pub values: Vec<ChannelValue>,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub fps: i32,
    pub channels: Vec<Channel>,
    pub frames: Vec<Frame>,
}

impl AnimationClip {
    pub fn presence(&self) -> ChannelFlags {
        self.channels.iter().fold(ChannelFlags::empty(), |acc, channel| acc | channel.kind.flag())
    }

    pub fn duration(&self) -> f32 {
        if self.fps <= 0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.fps as f32
    }

    pub fn value(&self, frame: usize, channel: usize) -> Option<&ChannelValue> {
        self.frames.get(frame)?.values.get(channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Skeletal,
    Camera,
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<AnimationClip, DecodeError> {
    decode_with_mode(bytes, encoding, DecodeMode::Skeletal)
}

pub fn decode_camera(bytes: &[u8], encoding: TextEncoding) -> Result<AnimationClip, DecodeError> {
    decode_with_mode(bytes, encoding, DecodeMode::Camera)
}

pub fn decode_with_mode(
    bytes: &[u8],
    encoding: TextEncoding,
    mode: DecodeMode,
) -> Result<AnimationClip, DecodeError> {
    let mut reader = ByteReader::new(bytes, encoding);
    reader.expect_magic("ZMO")?;
    let fps = reader.read_i32()?;
    let frame_count = reader.read_count("frame")?;
    let channel_count = reader.read_count("channel")?;

    let mut channels = Vec::with_capacity(channel_count.min(reader.remaining()));
    for _ in 0..channel_count {
        let offset = reader.offset();
        let tag = reader.read_u32()?;
        let kind = ChannelKind::from_tag(tag).ok_or(DecodeError::Unsupported {
            offset,
            what: "animation channel type",
            value: tag,
        })?;
        let bone = reader.read_i32()?;
        channels.push(Channel { kind, bone });
    }

    let mut frames = Vec::with_capacity(frame_count.min(reader.remaining()));
    for _ in 0..frame_count {
        let mut values = Vec::with_capacity(channels.len());
        for channel in &channels {
            let value = match channel.kind {
                ChannelKind::Position => ChannelValue::Position(reader.read_vec3()?),
                ChannelKind::Rotation => ChannelValue::Rotation(reader.read_quat_wxyz()?),
                ChannelKind::Normal => ChannelValue::Normal(reader.read_vec3()?),
                ChannelKind::Alpha => ChannelValue::Alpha(reader.read_f32()?),
                ChannelKind::Uv(_) => ChannelValue::Uv(reader.read_vec2()?),
                ChannelKind::TextureAnim => ChannelValue::TextureAnim(reader.read_f32()?),
                ChannelKind::Scale => ChannelValue::Scale(reader.read_f32()?),
            };
            values.push(value);
        }
        frames.push(Frame { values });
    }

    let mut clip = AnimationClip { fps, channels, frames };
    if mode == DecodeMode::Camera {
        remap_camera_positions(&mut clip);
    }
    Ok(clip)
}

/// Moves the eye and target tracks (the first two position channels) from file space
/// into editor world space.
fn remap_camera_positions(clip: &mut AnimationClip) {
    let targets: Vec<usize> = clip
        .channels
        .iter()
        .enumerate()
        .filter(|(_, channel)| channel.kind == ChannelKind::Position)
        .map(|(index, _)| index)
        .take(2)
        .collect();
    for frame in &mut clip.frames {
        for &index in &targets {
            if let Some(ChannelValue::Position(value)) = frame.values.get_mut(index) {
                *value = camera_to_world(*value);
            }
        }
    }
}

pub fn camera_to_world(value: Vec3) -> Vec3 {
    let scaled = value / CAMERA_DIVISOR + CAMERA_OFFSET;
    Vec3::new(scaled.x, scaled.z, -scaled.y)
}
