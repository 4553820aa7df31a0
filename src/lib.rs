pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod history;
pub mod scene;

pub use error::{DecodeError, LoadError};
pub use history::{Command, CommandLog, HISTORY_CAPACITY};
pub use scene::{Category, PlacementEntry, SceneContext};
