//! Player-side access to the File Service.

mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpFileService;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientError;

/// Remote song library operations.
///
/// Every call is a whole-file, request/response exchange.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Store `content` under `filename`, replacing any existing song.
    async fn upload(&self, content: Vec<u8>, filename: &str) -> Result<(), ClientError>;

    /// Fetch a song's full contents.
    async fn download(&self, filename: &str) -> Result<Bytes, ClientError>;

    /// Remove a song. Succeeds when the song is already absent.
    async fn delete(&self, filename: &str) -> Result<(), ClientError>;

    /// Every filename currently in the library.
    async fn list_available(&self) -> Result<Vec<String>, ClientError>;

    /// The library's album art image.
    async fn fetch_art(&self, size: u32) -> Result<Bytes, ClientError>;
}
