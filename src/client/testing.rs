//! In-memory File Service for tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::FileService;
use crate::error::ClientError;

/// Songs held in a map, plus a count of downloads served.
///
/// While offline every call fails with a 503.
#[derive(Default)]
pub(crate) struct MemoryFileService {
    songs: Mutex<BTreeMap<String, Vec<u8>>>,
    downloads: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MemoryFileService {
    pub(crate) fn with_songs(songs: &[(&str, &str)]) -> Self {
        let service = Self::default();
        {
            let mut map = service.songs.lock().unwrap();
            for (name, content) in songs {
                map.insert(name.to_string(), content.as_bytes().to_vec());
            }
        }
        service
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.songs.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn reachable(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Server {
                status: 503,
                message: "server down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FileService for MemoryFileService {
    async fn upload(&self, content: Vec<u8>, filename: &str) -> Result<(), ClientError> {
        self.reachable()?;
        self.songs
            .lock()
            .unwrap()
            .insert(filename.to_string(), content);
        Ok(())
    }

    async fn download(&self, filename: &str) -> Result<Bytes, ClientError> {
        self.reachable()?;
        self.downloads.lock().unwrap().push(filename.to_string());
        self.songs
            .lock()
            .unwrap()
            .get(filename)
            .map(|content| Bytes::from(content.clone()))
            .ok_or_else(|| ClientError::NotFound(filename.to_string()))
    }

    async fn delete(&self, filename: &str) -> Result<(), ClientError> {
        self.reachable()?;
        self.songs.lock().unwrap().remove(filename);
        Ok(())
    }

    async fn list_available(&self) -> Result<Vec<String>, ClientError> {
        self.reachable()?;
        Ok(self.names())
    }

    async fn fetch_art(&self, _size: u32) -> Result<Bytes, ClientError> {
        self.reachable()?;
        Ok(Bytes::from_static(b"art"))
    }
}
