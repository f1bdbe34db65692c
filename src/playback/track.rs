use lofty::file::TaggedFileExt;
use lofty::prelude::Accessor;
use lofty::read_from_path;
use std::path::{Path, PathBuf};

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "aac", "opus"];

/// Check if a file has a supported audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A song in the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Filename, identical to the song's name on the server.
    pub file_name: String,
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl Track {
    /// Build a track from a file, reading tags when they parse.
    ///
    /// Returns `None` for paths without a UTF-8 filename.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();

        let tagged_file = read_from_path(path).ok();
        let tag = tagged_file.as_ref().and_then(|f| f.first_tag());

        Some(Self {
            file_name,
            path: path.to_path_buf(),
            title: tag.and_then(|t| t.title()).map(|s| s.to_string()),
            artist: tag.and_then(|t| t.artist()).map(|s| s.to_string()),
        })
    }

    /// "Artist - Title" when tagged, otherwise the filename.
    pub fn display_name(&self) -> String {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (None, Some(title)) => title.clone(),
            _ => self.file_name.clone(),
        }
    }
}
