//! musicbox - a shared song library and a player that mirrors it.
//!
//! The server half (`api`, `storage`) keeps one flat directory of songs
//! and exposes it over HTTP. The player half (`client`, `sync`,
//! `playback`, `commands`) mirrors that directory locally and plays it.

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod playback;
pub mod storage;
pub mod sync;
