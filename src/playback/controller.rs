//! Playlist navigation on top of an audio backend.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::backend::AudioBackend;
use super::playlist::Playlist;
use super::track::Track;
use super::PlaybackError;

/// Owns the playlist, the now-playing index and the audio backend.
///
/// Repeat is always on: when the last track ends, playback continues
/// from the first.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    library: PathBuf,
    playlist: Playlist,
    playing: bool,
    /// Whether the backend holds the current track.
    loaded: bool,
}

impl<B: AudioBackend> PlaybackController<B> {
    /// Create a stopped controller over a local song directory.
    pub fn new(backend: B, library: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            library: library.into(),
            playlist: Playlist::default(),
            playing: false,
            loaded: false,
        }
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.playlist.current()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Stop, rebuild the playlist from disk and start at the first track.
    pub fn reload(&mut self) -> Result<(), PlaybackError> {
        self.stop();
        self.playlist = Playlist::from_dir(&self.library)?;

        info!(tracks = self.playlist.len(), "Playlist loaded");

        if self.playlist.is_empty() {
            return Ok(());
        }
        self.start_current(true)
    }

    /// Stop playback and unload the current track.
    pub fn stop(&mut self) {
        self.backend.stop();
        self.playing = false;
        self.loaded = false;
    }

    /// Resume playback. Does nothing if already playing.
    ///
    /// After a stop the current track is loaded again from disk.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.playing || self.playlist.is_empty() {
            return Ok(());
        }
        if !self.loaded {
            return self.start_current(true);
        }
        self.backend.play();
        self.playing = true;
        Ok(())
    }

    /// Pause playback. Does nothing if already paused.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.backend.pause();
        self.playing = false;
    }

    /// Pause when playing, play when paused.
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Skip to the next track, wrapping around, and play it.
    pub fn next(&mut self) -> Result<Option<&Track>, PlaybackError> {
        if self.playlist.advance().is_none() {
            return Ok(None);
        }
        self.start_current(true)?;
        Ok(self.playlist.current())
    }

    /// Go back to the previous track, wrapping around, and play it.
    pub fn previous(&mut self) -> Result<Option<&Track>, PlaybackError> {
        if self.playlist.retreat().is_none() {
            return Ok(None);
        }
        self.start_current(false)?;
        Ok(self.playlist.current())
    }

    /// Advance when the backend reports the current track finished.
    ///
    /// Returns true if playback moved to another track.
    pub fn poll(&mut self) -> Result<bool, PlaybackError> {
        if !self.playing || !self.backend.is_finished() {
            return Ok(false);
        }
        debug!("Track finished, advancing");
        self.next()?;
        Ok(true)
    }

    /// Load and play the current track, skipping tracks that fail to load
    /// in the direction of travel. Gives up after one full pass.
    fn start_current(&mut self, forward: bool) -> Result<(), PlaybackError> {
        let mut last_error = None;

        for _ in 0..self.playlist.len() {
            let Some(track) = self.playlist.current() else {
                break;
            };
            let path = track.path.clone();

            match self.backend.load(&path) {
                Ok(()) => {
                    self.backend.play();
                    self.playing = true;
                    self.loaded = true;
                    info!(track = %path.display(), index = ?self.playlist.index(), "Now playing");
                    return Ok(());
                }
                Err(e) => {
                    warn!(track = %path.display(), error = %e, "Skipping unplayable track");
                    last_error = Some(e);
                    if forward {
                        self.playlist.advance();
                    } else {
                        self.playlist.retreat();
                    }
                }
            }
        }

        self.playing = false;
        self.loaded = false;
        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::backend::ScriptedBackend;
    use tempfile::{tempdir, TempDir};

    fn library(names: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        dir
    }

    fn loaded_controller(dir: &TempDir) -> PlaybackController<ScriptedBackend> {
        let mut controller = PlaybackController::new(ScriptedBackend::default(), dir.path());
        controller.reload().unwrap();
        controller
    }

    fn current_name<B: AudioBackend>(controller: &PlaybackController<B>) -> &str {
        &controller.now_playing().unwrap().file_name
    }

    #[test]
    fn test_reload_starts_first_track() {
        let dir = library(&["b.mp3", "a.mp3", "c.mp3"]);
        let controller = loaded_controller(&dir);

        assert!(controller.is_playing());
        assert_eq!(current_name(&controller), "a.mp3");
        assert_eq!(controller.backend().loads, vec![dir.path().join("a.mp3")]);
        assert!(!controller.backend().is_paused());
    }

    #[test]
    fn test_reload_empty_library() {
        let dir = library(&[]);
        let mut controller = loaded_controller(&dir);

        assert!(!controller.is_playing());
        assert!(controller.now_playing().is_none());
        assert!(controller.next().unwrap().is_none());
        controller.play().unwrap();
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut controller = loaded_controller(&dir);

        controller.next().unwrap();
        controller.next().unwrap();
        assert_eq!(controller.playlist().index(), Some(2));

        controller.next().unwrap();
        assert_eq!(controller.playlist().index(), Some(0));

        controller.previous().unwrap();
        assert_eq!(controller.playlist().index(), Some(2));
        assert_eq!(current_name(&controller), "c.mp3");
    }

    #[test]
    fn test_next_resumes_when_paused() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let mut controller = loaded_controller(&dir);

        controller.pause();
        assert!(!controller.is_playing());
        assert!(controller.backend().is_paused());

        controller.next().unwrap();

        assert!(controller.is_playing());
        assert!(!controller.backend().is_paused());
    }

    #[test]
    fn test_play_is_idempotent() {
        let dir = library(&["a.mp3"]);
        let mut controller = loaded_controller(&dir);
        let loads_before = controller.backend().loads.len();

        controller.play().unwrap();
        controller.play().unwrap();

        assert!(controller.is_playing());
        assert_eq!(controller.backend().loads.len(), loads_before);
    }

    #[test]
    fn test_toggle() {
        let dir = library(&["a.mp3"]);
        let mut controller = loaded_controller(&dir);

        controller.toggle().unwrap();
        assert!(!controller.is_playing());
        controller.toggle().unwrap();
        assert!(controller.is_playing());
    }

    #[test]
    fn test_poll_repeats_from_start() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let mut controller = loaded_controller(&dir);

        assert!(!controller.poll().unwrap());

        controller.backend.finished = true;
        assert!(controller.poll().unwrap());
        assert_eq!(current_name(&controller), "b.mp3");

        controller.backend.finished = true;
        assert!(controller.poll().unwrap());
        assert_eq!(current_name(&controller), "a.mp3");
    }

    #[test]
    fn test_poll_ignored_while_paused() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let mut controller = loaded_controller(&dir);
        controller.pause();
        controller.backend.finished = true;

        assert!(!controller.poll().unwrap());
        assert_eq!(current_name(&controller), "a.mp3");
    }

    #[test]
    fn test_reload_picks_up_new_files() {
        let dir = library(&["b.mp3"]);
        let mut controller = loaded_controller(&dir);
        controller.next().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"a").unwrap();

        controller.reload().unwrap();

        assert_eq!(controller.playlist().len(), 2);
        assert_eq!(controller.playlist().index(), Some(0));
        assert_eq!(current_name(&controller), "a.mp3");
        assert!(controller.backend().stops >= 2);
    }

    #[test]
    fn test_play_after_stop_loads_current_track() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let mut controller = loaded_controller(&dir);
        controller.stop();
        assert!(controller.backend().loaded.is_none());

        controller.play().unwrap();

        assert!(controller.is_playing());
        assert_eq!(controller.backend().loaded, Some(dir.path().join("a.mp3")));
    }

    fn controller_with_unplayable(dir: &TempDir, names: &[&str]) -> PlaybackController<ScriptedBackend> {
        let backend = ScriptedBackend {
            unplayable: names.iter().map(|n| dir.path().join(n)).collect(),
            ..Default::default()
        };
        PlaybackController::new(backend, dir.path())
    }

    #[test]
    fn test_reload_skips_unplayable_first_track() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut controller = controller_with_unplayable(&dir, &["a.mp3"]);

        controller.reload().unwrap();

        assert!(controller.is_playing());
        assert_eq!(current_name(&controller), "b.mp3");
        assert_eq!(controller.backend().loaded, Some(dir.path().join("b.mp3")));
    }

    #[test]
    fn test_poll_skips_unplayable_track_and_keeps_repeating() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut controller = controller_with_unplayable(&dir, &["b.mp3"]);
        controller.reload().unwrap();

        controller.backend.finished = true;
        assert!(controller.poll().unwrap());
        assert_eq!(current_name(&controller), "c.mp3");

        controller.backend.finished = true;
        assert!(controller.poll().unwrap());
        assert_eq!(current_name(&controller), "a.mp3");
        assert!(controller.is_playing());
    }

    #[test]
    fn test_previous_skips_backwards() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut controller = controller_with_unplayable(&dir, &["c.mp3"]);
        controller.reload().unwrap();

        controller.previous().unwrap();

        assert_eq!(current_name(&controller), "b.mp3");
    }

    #[test]
    fn test_nothing_playable_gives_up_after_one_pass() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let mut controller = controller_with_unplayable(&dir, &["a.mp3", "b.mp3"]);

        let result = controller.reload();

        assert!(matches!(result, Err(PlaybackError::Decode { .. })));
        assert!(!controller.is_playing());
        assert_eq!(controller.backend().loads.len(), 2);
        assert_eq!(controller.playlist().index(), Some(0));
    }
}
