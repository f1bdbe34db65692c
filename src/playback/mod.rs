//! Local playback of the mirrored song library.

pub mod backend;
pub mod controller;
pub mod playlist;
pub mod track;

pub use backend::{AudioBackend, SilentBackend};
#[cfg(feature = "rodio")]
pub use backend::RodioBackend;
pub use controller::PlaybackController;
pub use playlist::Playlist;
pub use track::Track;

use std::path::PathBuf;

/// Playback errors.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The audio output device could not be opened or used.
    #[error("Audio device error: {0}")]
    Device(String),

    /// A song file could not be decoded.
    #[error("Cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
