//! File Service over HTTP

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::FileService;
use crate::error::{ClientError, ErrorResponse};

/// Time allowed to establish a connection, separate from the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the musicbox server
#[derive(Clone)]
pub struct HttpFileService {
    base_url: String,
    http_client: Client,
}

impl HttpFileService {
    /// Create a new client with the given per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let http_client = Client::builder()
            .user_agent(concat!("musicbox/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    fn songs_url(&self) -> String {
        format!("{}/api/songs", self.base_url)
    }

    fn song_url(&self, filename: &str) -> String {
        format!("{}/{}", self.songs_url(), urlencoding::encode(filename))
    }

    /// Turn a non-success response into an error.
    ///
    /// `subject` names the thing requested, for not-found errors.
    async fn check(response: Response, subject: &str) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(subject.to_string()));
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FileService for HttpFileService {
    async fn upload(&self, content: Vec<u8>, filename: &str) -> Result<(), ClientError> {
        let url = self.song_url(filename);
        debug!("Uploading {} ({} bytes): {}", filename, content.len(), url);

        let response = self.http_client.put(&url).body(content).send().await?;
        Self::check(response, filename).await?;

        Ok(())
    }

    async fn download(&self, filename: &str) -> Result<Bytes, ClientError> {
        let url = self.song_url(filename);
        debug!("Downloading {}: {}", filename, url);

        let response = self.http_client.get(&url).send().await?;
        let response = Self::check(response, filename).await?;

        Ok(response.bytes().await?)
    }

    async fn delete(&self, filename: &str) -> Result<(), ClientError> {
        let url = self.song_url(filename);
        debug!("Deleting {}: {}", filename, url);

        let response = self.http_client.delete(&url).send().await?;
        Self::check(response, filename).await?;

        Ok(())
    }

    async fn list_available(&self) -> Result<Vec<String>, ClientError> {
        let url = self.songs_url();
        debug!("Listing songs: {}", url);

        let response = self.http_client.get(&url).send().await?;
        let songs: Vec<String> = Self::check(response, "song list").await?.json().await?;

        debug!("Server has {} songs", songs.len());
        Ok(songs)
    }

    async fn fetch_art(&self, size: u32) -> Result<Bytes, ClientError> {
        let url = format!("{}/api/art?size={}", self.base_url, size);
        debug!("Fetching album art: {}", url);

        let response = self.http_client.get(&url).send().await?;
        let response = Self::check(response, "album art").await?;

        Ok(response.bytes().await?)
    }
}
