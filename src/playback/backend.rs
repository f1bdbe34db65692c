//! Audio output behind the playback controller.

use std::path::{Path, PathBuf};

use super::PlaybackError;

/// An audio engine that plays one loaded track at a time.
pub trait AudioBackend {
    /// Replace whatever is loaded with the file at `path`, paused.
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop and unload.
    fn stop(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the loaded track has played to its end.
    fn is_finished(&self) -> bool;
}

/// Backend with no audio device. Tracks state only; songs never end.
#[derive(Debug)]
pub struct SilentBackend {
    loaded: Option<PathBuf>,
    paused: bool,
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self {
            loaded: None,
            paused: true,
        }
    }
}

impl SilentBackend {
    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }
}

impl AudioBackend for SilentBackend {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        tracing::debug!(path = %path.display(), "Loaded track (silent)");
        self.loaded = Some(path.to_path_buf());
        self.paused = true;
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_finished(&self) -> bool {
        false
    }
}

#[cfg(feature = "rodio")]
pub use self::rodio_backend::RodioBackend;

#[cfg(feature = "rodio")]
mod rodio_backend {
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use super::AudioBackend;
    use crate::playback::PlaybackError;

    /// Plays through the default system output device.
    pub struct RodioBackend {
        // Dropping the stream silences the device
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Sink,
        loaded: bool,
    }

    impl RodioBackend {
        /// Open the default output device.
        pub fn new() -> Result<Self, PlaybackError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
            let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::Device(e.to_string()))?;
            sink.pause();

            Ok(Self {
                _stream: stream,
                handle,
                sink,
                loaded: false,
            })
        }
    }

    impl AudioBackend for RodioBackend {
        fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
            let file = File::open(path)?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

            let sink =
                Sink::try_new(&self.handle).map_err(|e| PlaybackError::Device(e.to_string()))?;
            sink.pause();
            sink.append(source);

            self.sink.stop();
            self.sink = sink;
            self.loaded = true;
            Ok(())
        }

        fn play(&mut self) {
            self.sink.play();
        }

        fn pause(&mut self) {
            self.sink.pause();
        }

        fn stop(&mut self) {
            self.sink.stop();
            self.loaded = false;
        }

        fn is_paused(&self) -> bool {
            self.sink.is_paused()
        }

        fn is_finished(&self) -> bool {
            self.loaded && self.sink.empty()
        }
    }
}

/// Backend for tests whose tracks can be made to finish on demand.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    pub loads: Vec<PathBuf>,
    pub loaded: Option<PathBuf>,
    pub paused: bool,
    pub finished: bool,
    pub stops: usize,
    /// Paths whose load fails as if the file could not be decoded.
    pub unplayable: Vec<PathBuf>,
}

#[cfg(test)]
impl AudioBackend for ScriptedBackend {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.loads.push(path.to_path_buf());
        if self.unplayable.iter().any(|p| p == path) {
            self.loaded = None;
            return Err(PlaybackError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported format".to_string(),
            });
        }
        self.loaded = Some(path.to_path_buf());
        self.paused = true;
        self.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.loaded = None;
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
