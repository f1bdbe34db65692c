//! Mirror the server's song library into the local cache directory.
//!
//! Presence by filename alone decides whether a song is fetched. Local
//! files missing from the server are left alone.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::FileService;
use crate::error::ClientError;
use crate::storage::validate_filename;

/// Prefix of downloads still being written. Hidden, so never played.
const TEMP_PREFIX: &str = ".sync-";

/// What a sync run did, by local filename.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Songs fetched from the server.
    pub downloaded: Vec<String>,
    /// Songs already present locally.
    pub skipped: Vec<String>,
    /// Names listed by the server whose base filename is unsafe to write
    /// locally.
    pub rejected: Vec<String>,
}

/// Download every remote song missing from `cache_dir`.
///
/// Each download lands in a hidden temporary file and is renamed into
/// place once fully written, so an interrupted run never leaves a partial
/// song under its real name.
pub async fn sync_library<S>(service: &S, cache_dir: &Path) -> Result<SyncReport, ClientError>
where
    S: FileService + ?Sized,
{
    info!(cache = %cache_dir.display(), "Syncing library from server");

    fs::create_dir_all(cache_dir).await?;
    remove_stale_downloads(cache_dir).await?;

    let remote = service.list_available().await?;
    let mut report = SyncReport::default();

    for name in remote {
        let Some(local_name) = local_name(&name) else {
            warn!(file = %name, "Server listed an unsafe filename, skipping");
            report.rejected.push(name);
            continue;
        };

        let target = cache_dir.join(&local_name);
        if fs::try_exists(&target).await? {
            debug!("Already cached: {}", local_name);
            report.skipped.push(local_name);
            continue;
        }

        let data = service.download(&name).await?;
        write_atomic(cache_dir, &target, &data).await?;

        debug!("Downloaded {} as {} ({} bytes)", name, local_name, data.len());
        report.downloaded.push(local_name);
    }

    info!(
        downloaded = report.downloaded.len(),
        skipped = report.skipped.len(),
        rejected = report.rejected.len(),
        "Sync complete"
    );

    Ok(report)
}

/// The base filename a remote song is cached under, if it is safe to use.
fn local_name(remote: &str) -> Option<String> {
    let base = Path::new(remote).file_name()?.to_str()?;
    validate_filename(base).ok()?;
    Some(base.to_string())
}

async fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> Result<(), ClientError> {
    let temp_path = dir.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4()));

    if let Err(e) = fs::write(&temp_path, data).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, target).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

/// Remove temporaries left behind by a previous run that was cut short.
async fn remove_stale_downloads(dir: &Path) -> Result<(), ClientError> {
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let is_stale = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(TEMP_PREFIX))
            .unwrap_or(false);

        if is_stale {
            debug!("Removing stale download: {}", entry.path().display());
            fs::remove_file(entry.path()).await?;
        }
    }

    Ok(())
}
