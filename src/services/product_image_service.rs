//! Product image service - Validates and stores uploaded product images.
//!
//! Stored files are named `{uuid}.{ext}` and live in the upload
//! directory, which the router serves under `/product-images`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

use crate::config::{Config, ALLOWED_IMAGE_TYPES};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// An image file received with the product form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    /// File name as sent by the browser
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Stored file extension for the content type, if it is accepted
    pub fn extension(&self) -> Option<&'static str> {
        ALLOWED_IMAGE_TYPES
            .iter()
            .find(|(mime, _)| self.content_type.eq_ignore_ascii_case(mime))
            .map(|(_, ext)| *ext)
    }
}

/// Product image validation and storage.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductImageService: Send + Sync {
    /// A submitted file must be a non-empty png, jpeg or gif within the
    /// size limit. Submitting no file needs no check.
    fn is_valid(&self, image: &UploadedImage) -> bool;

    /// Write the image to storage and return the stored file name.
    async fn store(&self, image: &UploadedImage) -> AppResult<String>;

    /// Delete a stored image. A file that is already gone is not an error.
    async fn remove(&self, file_name: &str) -> AppResult<()>;
}

/// Filesystem-backed image storage
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.upload_dir, config.max_image_bytes)
    }
}

#[async_trait]
impl ProductImageService for ImageStore {
    fn is_valid(&self, image: &UploadedImage) -> bool {
        image.extension().is_some()
            && !image.bytes.is_empty()
            && image.bytes.len() <= self.max_bytes
    }

    async fn store(&self, image: &UploadedImage) -> AppResult<String> {
        let ext = image.extension().ok_or_else(|| {
            AppError::bad_request(format!("Unsupported image type {}", image.content_type))
        })?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::internal(format!("Cannot create upload directory: {}", e)))?;
        tokio::fs::write(self.dir.join(&file_name), &image.bytes)
            .await
            .map_err(|e| AppError::internal(format!("Cannot write product image: {}", e)))?;

        tracing::debug!(file = %file_name, size = image.bytes.len(), "Product image stored");
        Ok(file_name)
    }

    async fn remove(&self, file_name: &str) -> AppResult<()> {
        // only the final component, so a stored name cannot leave the directory
        let Some(name) = Path::new(file_name).file_name() else {
            return Ok(());
        };

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                tracing::debug!(file = %file_name, "Product image removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!(
                "Cannot remove product image: {}",
                e
            ))),
        }
    }
}
