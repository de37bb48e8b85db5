// file: src/loader/staging.rs
// description: temporary staging directory for uploaded pdf files
// reference: https://docs.rs/uuid

use crate::error::{RagError, Result};
use crate::utils::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An uploaded file copied into the staging directory under a unique name.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub original_name: String,
    pub path: PathBuf,
    pub size: u64,
}

pub struct StagingArea {
    dir: PathBuf,
    max_file_size_mb: usize,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>, max_file_size_mb: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| RagError::file_operation(&dir, e))?;
        debug!("Staging area ready at {}", dir.display());

        Ok(Self {
            dir,
            max_file_size_mb,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate an uploaded file on disk and copy it into the staging area.
    pub fn stage(&self, upload: &Path) -> Result<StagedFile> {
        Validator::validate_file_path(upload)?;
        Validator::validate_pdf_extension(upload)?;

        let original_name = upload
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| upload.display().to_string());

        // Oversized uploads are rejected before they are read into memory.
        let size = fs::metadata(upload)
            .map_err(|e| RagError::file_operation(upload, e))?
            .len();
        Validator::validate_file_size(&original_name, size, self.max_file_size_mb)?;

        let bytes = fs::read(upload).map_err(|e| RagError::file_operation(upload, e))?;

        self.stage_bytes(&original_name, &bytes)
    }

    /// Stage an in-memory upload.
    pub fn stage_bytes(&self, original_name: &str, bytes: &[u8]) -> Result<StagedFile> {
        Validator::validate_pdf_extension(Path::new(original_name))?;
        Validator::validate_pdf_header(original_name, bytes)?;
        Validator::validate_file_size(original_name, bytes.len() as u64, self.max_file_size_mb)?;

        let path = self.dir.join(format!("{}.pdf", Uuid::new_v4()));
        fs::write(&path, bytes).map_err(|e| RagError::file_operation(&path, e))?;

        info!("Staged {} as {}", original_name, path.display());

        Ok(StagedFile {
            original_name: original_name.to_string(),
            path,
            size: bytes.len() as u64,
        })
    }

    pub fn remove(&self, staged: &StagedFile) {
        if let Err(e) = fs::remove_file(&staged.path) {
            warn!("Failed to remove staged file {}: {}", staged.path.display(), e);
        }
    }

    /// Delete every staged pdf. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(RagError::file_operation(&self.dir, e)),
        };

        for entry in entries {
            let path = entry.map_err(|e| RagError::file_operation(&self.dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "pdf") {
                fs::remove_file(&path).map_err(|e| RagError::file_operation(&path, e))?;
                removed += 1;
            }
        }

        info!("Cleared {} staged files from {}", removed, self.dir.display());
        Ok(removed)
    }
}
