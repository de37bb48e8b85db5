// file: src/loader/pdf.rs
// description: pdf text extraction into per-page source documents
// reference: https://docs.rs/lopdf, https://docs.rs/pdf-extract

use crate::error::{RagError, Result};
use crate::loader::cleaner::TextCleaner;
use crate::loader::staging::StagedFile;
use crate::models::SourceDocument;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct PdfLoader {
    cleaner: TextCleaner,
}

impl PdfLoader {
    pub fn new() -> Self {
        Self {
            cleaner: TextCleaner::new(),
        }
    }

    /// Load a staged upload, one document per page with text.
    pub fn load(&self, staged: &StagedFile) -> Result<Vec<SourceDocument>> {
        let bytes = fs::read(&staged.path).map_err(|e| RagError::file_operation(&staged.path, e))?;
        let pages = self.extract_pages(&staged.original_name, &bytes)?;

        let documents: Vec<SourceDocument> = pages
            .into_iter()
            .map(|(page, text)| {
                SourceDocument::new(text, staged.original_name.clone(), page, staged.path.clone())
            })
            .collect();

        if documents.is_empty() {
            warn!("No extractable text in {}", staged.original_name);
        } else {
            info!(
                "Loaded {} pages from {}",
                documents.len(),
                staged.original_name
            );
        }

        Ok(documents)
    }

    /// Load every `**/*.pdf` below `root`.
    pub fn load_directory(&self, root: &Path) -> Result<Vec<SourceDocument>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file()
                || !path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            {
                continue;
            }

            let staged = StagedFile {
                original_name: path
                    .strip_prefix(root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string(),
                path: path.to_path_buf(),
                size: entry.metadata().map(|m| m.len()).unwrap_or(0),
            };
            documents.extend(self.load(&staged)?);
        }

        info!(
            "Loaded {} pages from directory {}",
            documents.len(),
            root.display()
        );
        Ok(documents)
    }

    /// Returns `(page_number, cleaned_text)` for every page with text.
    pub fn extract_pages(&self, name: &str, bytes: &[u8]) -> Result<Vec<(u32, String)>> {
        let document =
            lopdf::Document::load_mem(bytes).map_err(|e| RagError::pdf_extraction(name, e))?;

        let mut pages = Vec::new();
        for page_number in document.get_pages().keys().copied() {
            match document.extract_text(&[page_number]) {
                Ok(text) => {
                    let text = self.cleaner.clean(&text);
                    if !text.is_empty() {
                        pages.push((page_number, text));
                    }
                }
                Err(e) => debug!("Page {} of {} has no text layer: {}", page_number, name, e),
            }
        }

        if pages.is_empty() {
            debug!("Falling back to whole-document extraction for {}", name);
            let text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| RagError::pdf_extraction(name, e))?;
            let text = self.cleaner.clean(&text);
            if !text.is_empty() {
                pages.push((1, text));
            }
        }

        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}
