//! Album art endpoint.

use actix_files::NamedFile;
use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, ArtQuery};

/// Fetch the library's album art.
///
/// GET /api/art?size={pixels}
///
/// A single fixed image is served whatever size is requested; callers
/// scale it themselves.
#[get("/api/art")]
pub async fn fetch_art(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<ArtQuery>,
) -> AppResult<HttpResponse> {
    if query.size == 0 {
        return Err(AppError::BadRequest(
            "Art size must be greater than zero".to_string(),
        ));
    }

    let art_path = data.store.art_path();
    if !art_path.is_file() {
        return Err(AppError::NotFound("No album art available".to_string()));
    }

    tracing::debug!(requested_size = query.size, "Serving album art");

    let file = NamedFile::open(art_path)?;
    Ok(file.into_response(&req))
}

/// Configure art routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(fetch_art);
}
