//! Command handlers behind the player's user interface.
//!
//! A presentation layer parses user intent into a [`Command`] and hands
//! it to [`Session::execute`]. Nothing here depends on a window system.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::client::FileService;
use crate::error::ClientError;
use crate::playback::{AudioBackend, PlaybackController, PlaybackError};
use crate::storage::validate_filename;
use crate::sync::{sync_library, SyncReport};

/// Album art size requested from the server, in pixels.
pub const ART_SIZE: u32 = 80;

/// A user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Upload a local file to the shared library.
    Upload(PathBuf),
    /// Delete the now-playing song locally and on the server.
    DeleteCurrent,
    Sync,
    List,
    NowPlaying,
    Art,
    Help,
    Quit,
}

/// Command parsing errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "toggle" | "p" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "upload" | "up" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingArgument("upload"));
                }
                Command::Upload(PathBuf::from(rest))
            }
            "delete" | "rm" => Command::DeleteCurrent,
            "sync" => Command::Sync,
            "list" | "ls" => Command::List,
            "now" => Command::NowPlaying,
            "art" => Command::Art,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(input.to_string())),
        };

        Ok(command)
    }
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  play | pause | toggle      control playback
  next | prev                skip with wraparound
  upload <path>              add a local file to the shared library
  delete                     remove the now-playing song everywhere
  sync                       fetch songs missing locally
  list                       show the playlist
  now                        show the now-playing song
  art                        fetch the album art
  quit";

/// Errors from executing a command.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] ClientError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Nothing is playing")]
    NothingPlaying,
}

/// A running player: remote library, local cache and playback.
pub struct Session<S: FileService, B: AudioBackend> {
    service: S,
    player: PlaybackController<B>,
    art_file: PathBuf,
}

impl<S: FileService, B: AudioBackend> Session<S, B> {
    pub fn new(service: S, backend: B, cache_dir: impl Into<PathBuf>, art_file: impl Into<PathBuf>) -> Self {
        Self {
            service,
            player: PlaybackController::new(backend, cache_dir),
            art_file: art_file.into(),
        }
    }

    pub fn player(&self) -> &PlaybackController<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.player
    }

    fn cache_dir(&self) -> &Path {
        self.player.library()
    }

    /// Sync with the server, then start playing from the first song.
    ///
    /// The local cache is played even if the sync fails; the sync error is
    /// still returned.
    pub async fn start(&mut self) -> Result<SyncReport, SessionError> {
        let synced = sync_library(&self.service, self.cache_dir()).await;
        self.player.reload()?;
        Ok(synced?)
    }

    /// Stop playback, sync, and restart the rebuilt playlist.
    ///
    /// The playlist is rebuilt from disk even when the sync fails.
    async fn refresh(&mut self) -> Result<SyncReport, SessionError> {
        self.player.stop();
        let synced = sync_library(&self.service, self.cache_dir()).await;
        self.player.reload()?;
        Ok(synced?)
    }

    /// Run one command, returning text to show the user.
    pub async fn execute(&mut self, command: Command) -> Result<String, SessionError> {
        match command {
            Command::Play => {
                self.player.play()?;
                Ok(self.now_playing_line())
            }
            Command::Pause => {
                self.player.pause();
                Ok("Paused".to_string())
            }
            Command::Toggle => {
                self.player.toggle()?;
                if self.player.is_playing() {
                    Ok(self.now_playing_line())
                } else {
                    Ok("Paused".to_string())
                }
            }
            Command::Next => {
                self.player.next()?;
                Ok(self.now_playing_line())
            }
            Command::Previous => {
                self.player.previous()?;
                Ok(self.now_playing_line())
            }
            Command::Upload(path) => self.upload(&path).await,
            Command::DeleteCurrent => self.delete_current().await,
            Command::Sync => {
                let report = self.refresh().await?;
                Ok(format!(
                    "Synced: {} downloaded, {} already present",
                    report.downloaded.len(),
                    report.skipped.len()
                ))
            }
            Command::List => Ok(self.playlist_listing()),
            Command::NowPlaying => Ok(self.now_playing_line()),
            Command::Art => self.fetch_art().await,
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => {
                self.player.stop();
                Ok("Goodbye".to_string())
            }
        }
    }

    async fn upload(&mut self, path: &Path) -> Result<String, SessionError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("{} has no usable filename", path.display()))
            })?
            .to_string();
        validate_filename(&filename).map_err(|e| ClientError::InvalidInput(e.to_string()))?;

        let content = tokio::fs::read(path).await.map_err(ClientError::from)?;
        let size = content.len();

        info!(file = %filename, size, "Uploading");
        self.service.upload(content, &filename).await?;
        self.refresh().await?;

        Ok(format!("Uploaded {} ({} bytes)", filename, size))
    }

    async fn delete_current(&mut self) -> Result<String, SessionError> {
        let filename = self
            .player
            .now_playing()
            .map(|t| t.file_name.clone())
            .ok_or(SessionError::NothingPlaying)?;

        info!(file = %filename, "Deleting");
        self.player.stop();

        if let Err(e) = self.remove_everywhere(&filename).await {
            if let Err(reload) = self.player.reload() {
                warn!(error = %reload, "Could not restart playback");
            }
            return Err(e.into());
        }
        self.refresh().await?;

        Ok(format!("Deleted {}", filename))
    }

    async fn remove_everywhere(&self, filename: &str) -> Result<(), ClientError> {
        let local = self.cache_dir().join(filename);
        match tokio::fs::remove_file(&local).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.service.delete(filename).await
    }

    async fn fetch_art(&mut self) -> Result<String, SessionError> {
        let image = self.service.fetch_art(ART_SIZE).await?;
        tokio::fs::write(&self.art_file, &image)
            .await
            .map_err(ClientError::from)?;

        Ok(format!(
            "Album art saved to {} ({} bytes)",
            self.art_file.display(),
            image.len()
        ))
    }

    fn now_playing_line(&self) -> String {
        match self.player.now_playing() {
            Some(track) if self.player.is_playing() => format!("Now Playing: {}", track.display_name()),
            Some(track) => format!("Paused: {}", track.display_name()),
            None => "Playlist is empty".to_string(),
        }
    }

    fn playlist_listing(&self) -> String {
        let playlist = self.player.playlist();
        if playlist.is_empty() {
            return "Playlist is empty".to_string();
        }

        let mut out = String::new();
        for (i, track) in playlist.tracks().iter().enumerate() {
            let marker = if Some(i) == playlist.index() { '>' } else { ' ' };
            let _ = writeln!(out, "{} {:>3}  {}", marker, i + 1, track.display_name());
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MemoryFileService;
    use crate::playback::backend::ScriptedBackend;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        session: Session<MemoryFileService, ScriptedBackend>,
    }

    impl Fixture {
        fn new(songs: &[(&str, &str)]) -> Self {
            let dir = tempdir().unwrap();
            let session = Session::new(
                MemoryFileService::with_songs(songs),
                ScriptedBackend::default(),
                dir.path().join("cache"),
                dir.path().join("art.img"),
            );
            Self { dir, session }
        }

        fn cache(&self) -> PathBuf {
            self.dir.path().join("cache")
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("next".parse(), Ok(Command::Next));
        assert_eq!("  PREV ".parse(), Ok(Command::Previous));
        assert_eq!(
            "upload /tmp/My Song.mp3".parse(),
            Ok(Command::Upload(PathBuf::from("/tmp/My Song.mp3")))
        );
        assert_eq!(
            "upload".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("upload"))
        );
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(ParseCommandError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_start_syncs_and_plays() {
        let mut fixture = Fixture::new(&[("b.mp3", "bb"), ("a.mp3", "a")]);

        let report = fixture.session.start().await.unwrap();

        assert_eq!(report.downloaded.len(), 2);
        assert!(fixture.session.player().is_playing());
        assert_eq!(
            fixture.session.player().now_playing().unwrap().file_name,
            "a.mp3"
        );
    }

    #[tokio::test]
    async fn test_upload_then_reload() {
        let mut fixture = Fixture::new(&[("a.mp3", "a")]);
        fixture.session.start().await.unwrap();
        let source = fixture.dir.path().join("new.mp3");
        std::fs::write(&source, b"fresh song").unwrap();

        let reply = fixture
            .session
            .execute(Command::Upload(source))
            .await
            .unwrap();

        assert_eq!(reply, "Uploaded new.mp3 (10 bytes)");
        assert_eq!(fixture.session.service.names(), vec!["a.mp3", "new.mp3"]);
        assert!(fixture.cache().join("new.mp3").is_file());
        assert_eq!(fixture.session.player().playlist().len(), 2);
        assert_eq!(fixture.session.player().playlist().index(), Some(0));
    }

    #[tokio::test]
    async fn test_delete_current_removes_everywhere() {
        let mut fixture = Fixture::new(&[("a.mp3", "a"), ("b.mp3", "b")]);
        fixture.session.start().await.unwrap();
        fixture.session.execute(Command::Next).await.unwrap();

        let reply = fixture
            .session
            .execute(Command::DeleteCurrent)
            .await
            .unwrap();

        assert_eq!(reply, "Deleted b.mp3");
        assert_eq!(fixture.session.service.names(), vec!["a.mp3"]);
        assert!(!fixture.cache().join("b.mp3").exists());
        assert_eq!(fixture.session.player().playlist().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_empty_playlist() {
        let mut fixture = Fixture::new(&[]);
        fixture.session.start().await.unwrap();

        let result = fixture.session.execute(Command::DeleteCurrent).await;

        assert!(matches!(result, Err(SessionError::NothingPlaying)));
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_without_side_effects() {
        let mut fixture = Fixture::new(&[("a.mp3", "a")]);
        fixture.session.start().await.unwrap();
        let missing = fixture.dir.path().join("missing.mp3");

        let result = fixture.session.execute(Command::Upload(missing)).await;

        assert!(matches!(
            result,
            Err(SessionError::Remote(ClientError::Io(_)))
        ));
        assert_eq!(fixture.session.service.names(), vec!["a.mp3"]);
        assert!(fixture.session.player().is_playing());
    }

    #[tokio::test]
    async fn test_art_saved() {
        let mut fixture = Fixture::new(&[]);

        fixture.session.execute(Command::Art).await.unwrap();

        assert_eq!(
            std::fs::read(fixture.dir.path().join("art.img")).unwrap(),
            b"art"
        );
    }

    #[tokio::test]
    async fn test_listing_marks_current() {
        let mut fixture = Fixture::new(&[("a.mp3", "a"), ("b.mp3", "b")]);
        fixture.session.start().await.unwrap();

        let listing = fixture.session.execute(Command::List).await.unwrap();

        assert_eq!(listing, ">   1  a.mp3\n    2  b.mp3");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_playback_alive() {
        let mut fixture = Fixture::new(&[("a.mp3", "a"), ("b.mp3", "b")]);
        fixture.session.start().await.unwrap();
        fixture.session.service.set_offline(true);

        let result = fixture.session.execute(Command::DeleteCurrent).await;

        assert!(matches!(
            result,
            Err(SessionError::Remote(ClientError::Server { status: 503, .. }))
        ));
        assert!(!fixture.cache().join("a.mp3").exists());
        assert_eq!(fixture.session.player().playlist().len(), 1);

        let reply = fixture.session.execute(Command::Play).await.unwrap();

        assert_eq!(reply, "Now Playing: b.mp3");
        assert!(fixture.session.player().is_playing());
        assert_eq!(
            fixture.session.player().backend().loaded,
            Some(fixture.cache().join("b.mp3"))
        );
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_playback_alive() {
        let mut fixture = Fixture::new(&[("a.mp3", "a")]);
        fixture.session.start().await.unwrap();
        fixture.session.service.set_offline(true);
        let source = fixture.dir.path().join("new.mp3");
        std::fs::write(&source, b"fresh song").unwrap();

        let result = fixture.session.execute(Command::Upload(source)).await;

        assert!(matches!(result, Err(SessionError::Remote(_))));
        assert!(fixture.session.player().is_playing());
        assert_eq!(
            fixture.session.player().backend().loaded,
            Some(fixture.cache().join("a.mp3"))
        );
    }

    #[tokio::test]
    async fn test_failed_sync_reloads_from_disk() {
        let mut fixture = Fixture::new(&[("a.mp3", "a")]);
        fixture.session.start().await.unwrap();
        fixture.session.service.set_offline(true);
        std::fs::write(fixture.cache().join("local.mp3"), b"local").unwrap();

        let result = fixture.session.execute(Command::Sync).await;

        assert!(matches!(result, Err(SessionError::Remote(_))));
        assert!(fixture.session.player().is_playing());
        assert_eq!(fixture.session.player().playlist().len(), 2);
        assert_eq!(
            fixture.session.player().backend().loaded,
            Some(fixture.cache().join("a.mp3"))
        );
    }

    #[tokio::test]
    async fn test_start_skips_unplayable_song() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache");
        let backend = ScriptedBackend {
            unplayable: vec![cache.join("a.mp3")],
            ..Default::default()
        };
        let mut session = Session::new(
            MemoryFileService::with_songs(&[("a.mp3", "corrupt"), ("b.mp3", "b")]),
            backend,
            &cache,
            dir.path().join("art.img"),
        );

        session.start().await.unwrap();

        assert!(session.player().is_playing());
        assert_eq!(session.player().now_playing().unwrap().file_name, "b.mp3");
    }
}
