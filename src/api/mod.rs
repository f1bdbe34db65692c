//! HTTP surface of the File Service.

pub mod art;
pub mod health;
pub mod songs;

use actix_web::web;

/// Configure every route served by the song server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(songs::configure)
        .configure(art::configure);
}
