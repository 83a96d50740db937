use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::shared::constants::{is_allowed_extension, DOCUMENT_FORMATS, IMAGE_FORMATS};
use crate::shared::validation::{file_extension, secure_filename, REPORT_NUM_REGEX};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("File not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::Io(_) => AppError::Internal(message),
            StorageError::InvalidFilename(_) => AppError::BadRequest(message),
            StorageError::UnsupportedType(_) => AppError::BadRequest(format!(
                "{}. Allowed types: {}, {}",
                message,
                IMAGE_FORMATS.join(", "),
                DOCUMENT_FORMATS.join(", ")
            )),
            StorageError::NotFound(_) => AppError::NotFound(message),
        }
    }
}

/// An upload waiting in the staging folder
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub filename: String,
    pub file_type: String,
}

/// Attachment files on the local filesystem
pub struct LocalStorage {
    upload_root: PathBuf,
    staging_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_root: config.upload_root.clone(),
            staging_dir: config.staging_dir.clone(),
        }
    }

    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;
        info!("Attachment staging folder ready: {}", self.staging_dir.display());
        Ok(())
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Folder holding every attachment of one report
    pub fn report_dir(&self, report_num: &str) -> Result<PathBuf, StorageError> {
        if !REPORT_NUM_REGEX.is_match(report_num) {
            return Err(StorageError::InvalidFilename(report_num.to_string()));
        }
        Ok(self.upload_root.join(report_num))
    }

    /// Whether `filename` is waiting in staging
    pub async fn is_staged(&self, filename: &str) -> bool {
        match checked_name(filename) {
            Ok(name) => tokio::fs::try_exists(self.staging_dir().join(name))
                .await
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Sanitize the name, check the extension and write the file to staging
    pub async fn stage(&self, original_name: &str, data: &[u8]) -> Result<StagedFile, StorageError> {
        let filename = secure_filename(original_name)
            .ok_or_else(|| StorageError::InvalidFilename(original_name.to_string()))?;

        let file_type = file_extension(&filename);
        if !is_allowed_extension(&file_type) {
            return Err(StorageError::UnsupportedType(file_type));
        }

        tokio::fs::create_dir_all(&self.staging_dir).await?;
        let path = self.staging_dir.join(&filename);
        tokio::fs::write(&path, data).await?;
        debug!("Staged attachment {} ({} bytes)", path.display(), data.len());

        Ok(StagedFile {
            filename,
            file_type,
        })
    }

    /// Move a staged file into the report's folder
    pub async fn move_to_report(&self, report_num: &str, filename: &str) -> Result<(), StorageError> {
        let filename = checked_name(filename)?;
        let report_dir = self.report_dir(report_num)?;
        tokio::fs::create_dir_all(&report_dir).await?;

        let src = self.staging_dir.join(filename);
        if !tokio::fs::try_exists(&src).await? {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        let dst = report_dir.join(filename);
        tokio::fs::rename(&src, &dst).await?;
        info!("Moved attachment {} to {}", filename, dst.display());
        Ok(())
    }

    pub async fn read_report_file(
        &self,
        report_num: &str,
        filename: &str,
    ) -> Result<Vec<u8>, StorageError> {
        let filename = checked_name(filename)?;
        let path = self.report_dir(report_num)?.join(filename);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Names coming back from clients must already be in sanitized form
fn checked_name(filename: &str) -> Result<&str, StorageError> {
    match secure_filename(filename) {
        Some(clean) if clean == filename => Ok(filename),
        _ => Err(StorageError::InvalidFilename(filename.to_string())),
    }
}
