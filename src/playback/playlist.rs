use std::fs;
use std::io;
use std::path::Path;

use super::track::{is_audio_file, Track};

/// Ordered songs plus the now-playing index.
///
/// Order is by filename so it does not depend on how the platform
/// enumerates directories. The index is always in bounds while the
/// playlist is non-empty.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    index: usize,
}

impl Playlist {
    /// Build a playlist starting at the first track.
    pub fn new(mut tracks: Vec<Track>) -> Self {
        tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Self { tracks, index: 0 }
    }

    /// Build a playlist from the audio files in a directory.
    ///
    /// Hidden files (in-flight downloads) and non-audio files are skipped.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let tracks = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| is_audio_file(path))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| !n.starts_with('.'))
                    .unwrap_or(false)
            })
            .filter_map(|path| Track::from_path(&path))
            .collect();

        Ok(Self::new(tracks))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Now-playing index, or `None` for an empty playlist.
    pub fn index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.index)
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    /// Move to the next track, wrapping from the last to the first.
    pub fn advance(&mut self) -> Option<&Track> {
        if self.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.tracks.len();
        self.current()
    }

    /// Move to the previous track, wrapping from the first to the last.
    pub fn retreat(&mut self) -> Option<&Track> {
        if self.is_empty() {
            return None;
        }
        self.index = (self.index + self.tracks.len() - 1) % self.tracks.len();
        self.current()
    }
}
