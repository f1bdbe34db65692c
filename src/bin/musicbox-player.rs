//! musicbox-player - mirrors the shared library locally and plays it.
//!
//! Reads commands from stdin, one per line (`help` lists them).

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use musicbox::client::HttpFileService;
use musicbox::commands::{Command, Session, HELP};
use musicbox::config;
use musicbox::logging::init_tracing;

/// How often the player checks whether the current song has ended.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[cfg(feature = "rodio")]
fn open_backend() -> Result<musicbox::playback::RodioBackend> {
    musicbox::playback::RodioBackend::new().context("Failed to open audio output")
}

#[cfg(not(feature = "rodio"))]
fn open_backend() -> Result<musicbox::playback::SilentBackend> {
    tracing::warn!("Built without the `rodio` feature; playback is silent");
    Ok(musicbox::playback::SilentBackend::default())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = config::load_client();

    init_tracing(&config.log_level, &config.log_format);

    config.validate().context("Invalid player configuration")?;

    let service = HttpFileService::new(&config.server_url, config.request_timeout)
        .context("Failed to create HTTP client")?;
    let backend = open_backend()?;

    tracing::info!(
        server = %config.server_url,
        cache = %config.cache_folder.display(),
        "Starting musicbox player"
    );

    let mut session = Session::new(service, backend, &config.cache_folder, &config.art_file);

    match session.execute(Command::Art).await {
        Ok(message) => println!("{}", message),
        Err(e) => tracing::warn!(error = %e, "Could not fetch album art"),
    }

    // A failed sync still leaves the local cache playable
    if let Err(e) = session.start().await {
        tracing::error!(error = %e, "Initial sync failed; playing local songs only");
    }

    println!("{}", HELP);
    if let Ok(message) = session.execute(Command::NowPlaying).await {
        println!("{}", message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let quitting = command == Command::Quit;

                match session.execute(command).await {
                    Ok(message) => println!("{}", message),
                    Err(e) => tracing::error!(error = %e, "Command failed"),
                }

                if quitting {
                    break;
                }
            }
            _ = ticker.tick() => {
                match session.player_mut().poll() {
                    Ok(true) => {
                        if let Ok(message) = session.execute(Command::NowPlaying).await {
                            println!("{}", message);
                        }
                    }
                    Ok(false) => {}
                    Err(e) => tracing::warn!(error = %e, "Could not advance to the next song"),
                }
            }
        }
    }

    session.player_mut().stop();
    Ok(())
}
