// file: src/utils/validation.rs
// description: upload and input validation helpers
// reference: input validation patterns

use crate::error::{RagError, Result};
use std::fs;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            RagError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(RagError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    pub fn validate_pdf_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
            _ => Err(RagError::Validation(format!(
                "File is not a PDF: {}",
                path.display()
            ))),
        }
    }

    /// PDF files start with `%PDF`, possibly after a few bytes of junk.
    pub fn validate_pdf_header(name: &str, bytes: &[u8]) -> Result<()> {
        let head = &bytes[..bytes.len().min(1024)];
        if head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            Ok(())
        } else {
            Err(RagError::Validation(format!(
                "File does not look like a PDF: {}",
                name
            )))
        }
    }

    pub fn validate_file_size(name: &str, size: u64, max_size_mb: usize) -> Result<()> {
        let max_size = (max_size_mb as u64) * 1024 * 1024;

        if size == 0 {
            return Err(RagError::Validation(format!("File is empty: {}", name)));
        }

        if size > max_size {
            return Err(RagError::Validation(format!(
                "File {} is {} MB, limit is {} MB",
                name,
                size / 1024 / 1024,
                max_size_mb
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RagError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}
