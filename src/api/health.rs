//! Health check endpoints.

use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::models::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Service name.
    pub service: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Service status.
    pub status: &'static str,
    /// Songs folder readable.
    pub songs_folder: bool,
    /// Album art asset present.
    pub album_art: bool,
}

/// Health check endpoint.
///
/// GET /health
///
/// Returns 200 if the service is running.
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: env!("CARGO_PKG_NAME"),
    })
}

/// Readiness check endpoint.
///
/// GET /ready
///
/// Returns 200 when the song library can be listed. Missing album art is
/// reported but does not make the service unready.
#[get("/ready")]
pub async fn ready(data: web::Data<AppState>) -> HttpResponse {
    let songs_folder_ok = data.store.list().is_ok();
    let album_art_ok = data.store.art_path().is_file();

    let response = ReadyResponse {
        status: if songs_folder_ok { "ready" } else { "not_ready" },
        songs_folder: songs_folder_ok,
        album_art: album_art_ok,
    };

    if songs_folder_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
