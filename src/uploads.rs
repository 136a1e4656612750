//! Storage for reference images attached to generation requests.

use std::io;
use std::path::{Path, PathBuf};

use actix_multipart::form::tempfile::TempFile;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::types::{ImageUrl, TypeConstraintError};

/// URL prefix under which stored uploads are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("failed to store upload: {0}")]
    Io(#[from] io::Error),
    #[error("invalid upload url: {0}")]
    InvalidUrl(#[from] TypeConstraintError),
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Opens the upload directory, creating it when missing.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checks the declared content type of an uploaded part.
    pub fn ensure_image(file: &TempFile) -> Result<(), UploadError> {
        match &file.content_type {
            Some(mime) if mime.type_().as_str() == "image" => Ok(()),
            _ => Err(UploadError::NotAnImage),
        }
    }

    /// Copies the temp file under a random name, keeping the original extension.
    pub fn store(&self, file: &TempFile) -> Result<ImageUrl, UploadError> {
        Self::ensure_image(file)?;

        let extension = file
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        let name = format!("{}{extension}", Uuid::new_v4());

        std::fs::copy(file.file.path(), self.dir.join(&name))?;
        log::info!("Stored upload {name} ({} bytes)", file.size);

        Ok(ImageUrl::new(format!("{UPLOADS_URL_PREFIX}/{name}"))?)
    }
}
