use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local};
use log::{error, info};

use crate::error::{Error, Result};

/// Export formats offered for a generated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Glb,
    Obj,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Glb => "glb",
            ExportFormat::Obj => "obj",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Glb => "model/gltf-binary",
            ExportFormat::Obj => "text/plain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Glb => "GLB",
            ExportFormat::Obj => "OBJ",
        }
    }

    /// `model_<date>_<time>.<ext>`
    pub fn filename(self, at: DateTime<Local>) -> String {
        format!("model_{}.{}", at.format("%Y-%m-%d_%H%M%S"), self.extension())
    }
}

/// A file written by the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub mime_type: String,
    pub bytes: usize,
}

/// Writes decoded payloads into a download directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    dir: PathBuf,
}

impl Downloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, falling back to the working directory.
    pub fn default_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes `payload` and saves it as `filename`.
    ///
    /// Nothing is written when the payload is not valid base64.
    pub fn download_as_file(&self, payload: &str, filename: &str, mime_type: &str) -> Result<SavedFile> {
        let bytes = decode_base64(payload).map_err(|e| {
            error!("Refusing to save {}: {}", filename, e);
            e
        })?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, &bytes)?;

        info!("Saved {} ({}, {} bytes)", path.display(), mime_type, bytes.len());
        Ok(SavedFile {
            path,
            mime_type: mime_type.to_string(),
            bytes: bytes.len(),
        })
    }

    pub fn export(&self, payload: &str, format: ExportFormat) -> Result<SavedFile> {
        let filename = format.filename(Local::now());
        self.download_as_file(payload, &filename, format.mime_type())
    }
}

/// Standard base64, tolerant of surrounding whitespace and line breaks.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::Decode("payload is empty".to_string()));
    }
    Ok(STANDARD.decode(compact)?)
}
