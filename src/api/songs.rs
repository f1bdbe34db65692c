//! Song library endpoints: upload, download, delete, list.

use actix_web::{delete, get, http::header, put, web, HttpResponse};
use bytes::BytesMut;
use futures::StreamExt;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, DeleteResponse, UploadResponse};

/// Read a request body into memory, enforcing the upload limit.
async fn read_body(mut payload: web::Payload, limit: usize) -> AppResult<BytesMut> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Upload interrupted: {}", e)))?;

        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload exceeds {} bytes",
                limit
            )));
        }

        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Upload a song, replacing any existing song of the same name.
///
/// PUT /api/songs/{filename}
///
/// The request body is the raw file content.
#[put("/api/songs/{filename}")]
pub async fn upload_song(
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let body = read_body(payload, data.max_upload_bytes).await?;

    data.store.write(&filename, &body)?;

    Ok(HttpResponse::Created().json(UploadResponse {
        file: filename,
        size: body.len(),
    }))
}

/// Download a song's full contents.
///
/// GET /api/songs/{filename}
#[get("/api/songs/{filename}")]
pub async fn download_song(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let content = data.store.read(&filename)?;

    tracing::debug!(file = %filename, size = content.len(), "Serving song");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(content))
}

/// Delete a song. Deleting an absent song succeeds.
///
/// DELETE /api/songs/{filename}
#[delete("/api/songs/{filename}")]
pub async fn delete_song(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let deleted = data.store.remove(&filename)?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        file: filename,
        deleted,
    }))
}

/// List every song filename in the library.
///
/// GET /api/songs
#[get("/api/songs")]
pub async fn list_songs(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let songs = data.store.list()?;

    tracing::debug!(count = songs.len(), "Listing songs");

    Ok(HttpResponse::Ok().json(songs))
}

/// Configure song routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_songs)
        .service(upload_song)
        .service(download_song)
        .service(delete_song);
}
