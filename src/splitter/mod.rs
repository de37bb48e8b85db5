// file: src/splitter/mod.rs
// description: text splitting module exports
// reference: internal module structure

pub mod character;

pub use character::CharacterTextSplitter;
