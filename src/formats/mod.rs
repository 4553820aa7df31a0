use crate::error::{DecodeError, LoadError};
use std::fs;
use std::path::Path;

pub mod chr;
pub mod ifo;
pub mod lit;
pub mod reader;
pub mod stb;
pub mod stl;
pub mod tileset;
pub mod zmo;
pub mod zms;
pub mod zon;

pub use reader::{ByteReader, FixedLayout, TextEncoding};

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    fs::read(path).map_err(|err| LoadError::io(path, err))
}

/// Reads `path` and runs `decode` over its bytes, tagging any failure with the path.
pub fn load_with<T>(
    path: impl AsRef<Path>,
    encoding: TextEncoding,
    decode: impl FnOnce(&[u8], TextEncoding) -> Result<T, DecodeError>,
) -> Result<T, LoadError> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    decode(&bytes, encoding).map_err(|err| LoadError::format(path, err))
}
