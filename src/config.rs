use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::api::{BackendClient, Downloader, FileStorage, HttpTransport, SessionStore};
use crate::cli::Cli;
use crate::error::Result;
use crate::viewer::normalize::{NormalizePolicy, VerticalAlign, DEFAULT_MAX_SIZE};

/// Largest accepted window or offscreen frame side, in pixels.
pub const MAX_FRAME_SIDE: u32 = 8192;

/// Settings resolved from the command line, environment and platform
/// directories.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub storage_file: PathBuf,
    pub download_dir: PathBuf,
    pub headless: bool,
    pub normalize: NormalizePolicy,
    pub width: u32,
    pub height: u32,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let max_size = if cli.max_size.is_finite() && cli.max_size > 0.0 {
            cli.max_size
        } else {
            warn!("Ignoring --max-size {}, using {}", cli.max_size, DEFAULT_MAX_SIZE);
            DEFAULT_MAX_SIZE
        };

        Self {
            base_url: cli.base_url.clone(),
            timeout: Duration::from_secs(cli.timeout_secs.max(1)),
            storage_file: cli.storage_file.clone().unwrap_or_else(FileStorage::default_path),
            download_dir: cli.download_dir.clone().unwrap_or_else(Downloader::default_dir),
            headless: cli.headless,
            normalize: NormalizePolicy {
                max_size,
                vertical: if cli.pin_to_ground {
                    VerticalAlign::Ground
                } else {
                    VerticalAlign::Center
                },
            },
            width: frame_side("--width", cli.width),
            height: frame_side("--height", cli.height),
        }
    }

    /// Backend client with the persisted session.
    pub fn client(&self) -> Result<BackendClient<FileStorage>> {
        let transport = HttpTransport::new(self.base_url.clone(), self.timeout)?;
        let session = SessionStore::load_or_create(FileStorage::new(&self.storage_file));
        Ok(BackendClient::new(transport, session))
    }

    pub fn downloader(&self) -> Downloader {
        Downloader::new(&self.download_dir)
    }
}

fn frame_side(flag: &str, value: u32) -> u32 {
    let side = value.clamp(1, MAX_FRAME_SIDE);
    if side != value {
        warn!("Clamping {} {} to {}", flag, value, side);
    }
    side
}
