use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfRange { offset: usize, len: usize, size: usize },

    #[error("seek to {target} is outside buffer of {size} bytes")]
    SeekOutOfRange { target: i128, size: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("bad magic '{found}' at offset {offset} (expected '{expected}')")]
    BadMagic { offset: usize, expected: &'static str, found: String },

    #[error("negative {what} count {count} at offset {offset}")]
    NegativeCount { offset: usize, what: &'static str, count: i64 },

    #[error("unsupported {what} {value:#x} at offset {offset}")]
    Unsupported { offset: usize, what: &'static str, value: u32 },

    #[error("table cell ({row}, {column}) is outside a {rows}x{columns} grid")]
    CellOutOfRange { row: usize, column: usize, rows: usize, columns: usize },

    #[error("table cell ({row}, {column}) '{text}' is not a valid {expected}")]
    CellParse { row: usize, column: usize, text: String, expected: &'static str },

    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing file {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to decode {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scene load worker stopped before reporting a result")]
    WorkerLost,
}

impl LoadError {
    pub fn format(path: impl Into<PathBuf>, source: DecodeError) -> Self {
        LoadError::Format { path: path.into(), source }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::MissingFile(path)
        } else {
            LoadError::Io { path, source }
        }
    }
}
