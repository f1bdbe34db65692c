//! Song storage backend.
//!
//! A flat directory of song files addressed by filename, plus one album
//! art asset living anywhere on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Longest filename accepted, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Prefix of in-flight upload files. Hidden, so never listed.
const TEMP_PREFIX: &str = ".upload-";

/// Validate a song filename to prevent path traversal attacks.
///
/// Returns an error if the filename is empty, too long, hidden, or contains
/// path separators or traversal sequences.
pub fn validate_filename(filename: &str) -> AppResult<&str> {
    // Reject empty filenames
    if filename.is_empty() {
        return Err(AppError::BadRequest("Filename cannot be empty".to_string()));
    }

    if filename.len() > MAX_FILENAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Filename exceeds {} bytes",
            MAX_FILENAME_LEN
        )));
    }

    // Reject path traversal attempts
    if filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        tracing::warn!(filename = %filename, "Path traversal attempt blocked");
        return Err(AppError::path_traversal());
    }

    // Reject drive-prefixed names (Windows)
    if filename.chars().nth(1) == Some(':') {
        return Err(AppError::path_traversal());
    }

    // Hidden names are reserved for in-flight temporaries
    if filename.starts_with('.') {
        return Err(AppError::BadRequest(
            "Filename cannot start with '.'".to_string(),
        ));
    }

    Ok(filename)
}

/// Storage operations behind the File Service.
pub trait SongStore: Send + Sync {
    /// Write a song, replacing any existing file of the same name.
    fn write(&self, filename: &str, content: &[u8]) -> AppResult<()>;

    /// Read a song's full contents.
    fn read(&self, filename: &str) -> AppResult<Vec<u8>>;

    /// Remove a song. Returns false if it was not present.
    fn remove(&self, filename: &str) -> AppResult<bool>;

    /// List all song filenames, sorted.
    fn list(&self) -> AppResult<Vec<String>>;

    /// Location of the album art asset.
    fn art_path(&self) -> &Path;

    /// Check if a song exists.
    fn contains(&self, filename: &str) -> AppResult<bool> {
        Ok(self.list()?.iter().any(|name| name == filename))
    }
}

/// Directory-backed song store.
#[derive(Debug)]
pub struct DirectorySongStore {
    root: PathBuf,
    art: PathBuf,
}

impl DirectorySongStore {
    /// Create a store over an existing directory.
    pub fn new(root: impl AsRef<Path>, art: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(AppError::Internal(format!(
                "Songs folder is not a directory: {}",
                root.display()
            )));
        }

        tracing::debug!(root = %root.display(), "Opened song store");

        Ok(Self {
            root,
            art: art.as_ref().to_path_buf(),
        })
    }

    /// Resolve a validated filename inside the store.
    fn path_for(&self, filename: &str) -> AppResult<PathBuf> {
        let filename = validate_filename(filename)?;
        Ok(self.root.join(filename))
    }

    /// Find an existing song whose name matches case-insensitively but not exactly.
    fn case_variant_of(&self, filename: &str) -> AppResult<Option<String>> {
        let lower = filename.to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .find(|existing| existing != filename && existing.to_lowercase() == lower))
    }
}

impl SongStore for DirectorySongStore {
    fn write(&self, filename: &str, content: &[u8]) -> AppResult<()> {
        let target = self.path_for(filename)?;

        // The album art may live in the songs folder; it is never a song
        if target == self.art {
            return Err(AppError::Conflict(format!(
                "'{}' is reserved for the album art",
                filename
            )));
        }

        if let Some(existing) = self.case_variant_of(filename)? {
            return Err(AppError::case_collision(filename, &existing));
        }

        // Write atomically using temp file
        let temp_path = self.root.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4()));
        if let Err(e) = fs::write(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &target) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::info!(file = %filename, size = content.len(), "Stored song");
        Ok(())
    }

    fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(filename)?;

        if !path.is_file() {
            return Err(AppError::song_not_found(filename));
        }

        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::song_not_found(filename),
            _ => e.into(),
        })
    }

    fn remove(&self, filename: &str) -> AppResult<bool> {
        let path = self.path_for(filename)?;
        if path == self.art {
            return Ok(false);
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(file = %filename, "Deleted song");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(file = %filename, "Delete of absent song ignored");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> AppResult<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| entry.path() != self.art)
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();

        names.sort();
        Ok(names)
    }

    fn art_path(&self) -> &Path {
        &self.art
    }
}
