// file: src/loader/mod.rs
// description: upload staging and pdf loading module exports
// reference: internal module structure

pub mod cleaner;
pub mod pdf;
pub mod staging;

pub use cleaner::TextCleaner;
pub use pdf::PdfLoader;
pub use staging::{StagedFile, StagingArea};
