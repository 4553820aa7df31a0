use crate::error::DecodeError;
use encoding_rs::Encoding;
use glam::{IVec2, Quat, Vec2, Vec3};
use std::fmt;
use std::io::SeekFrom;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Legacy code page used for every string the binary formats carry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub fn euc_kr() -> Self {
        TextEncoding(encoding_rs::EUC_KR)
    }

    pub fn windows_1252() -> Self {
        TextEncoding(encoding_rs::WINDOWS_1252)
    }

    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(TextEncoding)
    }

    pub fn name(self) -> &'static str {
        self.0.name()
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        let (text, _) = self.0.decode_without_bom_handling(bytes);
        text.into_owned()
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.0.encode(text);
        bytes.into_owned()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::euc_kr()
    }
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.name()).finish()
    }
}

/// Values stored as a fixed number of little-endian bytes.
pub trait FixedLayout: Sized {
    const SIZE: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! fixed_layout_int {
    ($($ty:ty),*) => {
        $(
            impl FixedLayout for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

fixed_layout_int!(u8, i8, u16, i16, u32, i32, f32);

impl FixedLayout for Vec2 {
    const SIZE: usize = 8;

    fn from_le_slice(bytes: &[u8]) -> Self {
        Vec2::new(f32::from_le_slice(&bytes[0..]), f32::from_le_slice(&bytes[4..]))
    }
}

impl FixedLayout for Vec3 {
    const SIZE: usize = 12;

    fn from_le_slice(bytes: &[u8]) -> Self {
        Vec3::new(
            f32::from_le_slice(&bytes[0..]),
            f32::from_le_slice(&bytes[4..]),
            f32::from_le_slice(&bytes[8..]),
        )
    }
}

/// Stored x, y, z, w. Formats that put w first go through [`ByteReader::read_quat_wxyz`].
impl FixedLayout for Quat {
    const SIZE: usize = 16;

    fn from_le_slice(bytes: &[u8]) -> Self {
        Quat::from_xyzw(
            f32::from_le_slice(&bytes[0..]),
            f32::from_le_slice(&bytes[4..]),
            f32::from_le_slice(&bytes[8..]),
            f32::from_le_slice(&bytes[12..]),
        )
    }
}

impl FixedLayout for IVec2 {
    const SIZE: usize = 8;

    fn from_le_slice(bytes: &[u8]) -> Self {
        IVec2::new(i32::from_le_slice(&bytes[0..]), i32::from_le_slice(&bytes[4..]))
    }
}

/// Forward-only cursor over an immutable byte buffer.
///
/// Every read advances the offset by exactly the width it consumed. A read that would
/// cross the end of the buffer fails with [`DecodeError::OutOfRange`] and leaves the
/// offset untouched.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    encoding: TextEncoding,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], encoding: TextEncoding) -> Self {
        Self { data, offset: 0, encoding }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<usize> {
        let size = self.data.len();
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.offset as i128 + delta as i128,
            SeekFrom::End(delta) => size as i128 + delta as i128,
        };
        if target < 0 || target > size as i128 {
            return Err(DecodeError::SeekOutOfRange { target, size });
        }
        self.offset = target as usize;
        Ok(self.offset)
    }

    /// Releases the borrowed buffer; the reader cannot be used afterwards.
    pub fn close(self) {}

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.data.len()).ok_or(
            DecodeError::OutOfRange { offset: self.offset, len, size: self.data.len() },
        )?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read<T: FixedLayout>(&mut self) -> Result<T> {
        self.read_bytes(T::SIZE).map(T::from_le_slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        self.read()
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        self.read()
    }

    pub fn read_quat(&mut self) -> Result<Quat> {
        self.read()
    }

    pub fn read_quat_wxyz(&mut self) -> Result<Quat> {
        let stored = self.read_quat()?;
        Ok(Quat::from_xyzw(stored.y, stored.z, stored.w, stored.x))
    }

    pub fn read_ivec2(&mut self) -> Result<IVec2> {
        self.read()
    }

    /// Reads an `i32` element count, rejecting negative values.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let offset = self.offset;
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| DecodeError::NegativeCount { offset, what, count: count as i64 })
    }

    /// ZString: one length byte followed by exactly that many bytes of text. Embedded
    /// NULs are part of the string.
    pub fn read_zstring(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self.read_u8()? as usize;
        match self.read_bytes(len) {
            Ok(bytes) => Ok(self.encoding.decode(bytes)),
            Err(err) => {
                self.offset = start;
                Err(err)
            }
        }
    }

    /// NUL-terminated string; the terminator is consumed.
    pub fn read_cstring(&mut self) -> Result<String> {
        let start = self.offset;
        let rest = &self.data[start..];
        let len = rest.iter().position(|b| *b == 0).ok_or(DecodeError::UnterminatedString { offset: start })?;
        let text = self.encoding.decode(&rest[..len]);
        self.offset = start + len + 1;
        Ok(text)
    }

    /// String with a 7-bit continuation length of one or two bytes.
    pub fn read_var_string(&mut self) -> Result<String> {
        let start = self.offset;
        let first = self.read_u8()?;
        let len = if first & 0x80 != 0 {
            match self.read_u8() {
                Ok(second) => (first & 0x7f) as usize | ((second as usize) << 7),
                Err(err) => {
                    self.offset = start;
                    return Err(err);
                }
            }
        } else {
            first as usize
        };
        match self.read_bytes(len) {
            Ok(bytes) => Ok(self.encoding.decode(bytes)),
            Err(err) => {
                self.offset = start;
                Err(err)
            }
        }
    }

    pub fn expect_magic(&mut self, expected: &'static str) -> Result<String> {
        let offset = self.offset;
        let magic = self.read_cstring()?;
        if !magic.starts_with(expected) {
            return Err(DecodeError::BadMagic { offset, expected, found: magic });
        }
        Ok(magic)
    }
}
