use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::SongStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SongStore>,
    pub max_upload_bytes: usize,
}

/// Body returned after a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file: String,
    pub size: usize,
}

/// Body returned by delete. `deleted` is false when nothing was there.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub file: String,
    pub deleted: bool,
}

/// Query string for `/api/art`.
#[derive(Debug, Deserialize)]
pub struct ArtQuery {
    #[serde(default = "default_art_size")]
    pub size: u32,
}

fn default_art_size() -> u32 {
    80
}
