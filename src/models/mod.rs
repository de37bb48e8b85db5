// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod chat;
pub mod document;
pub mod search_result;

pub use chat::{Answer, ChatTurn};
pub use document::{Chunk, SourceDocument};
pub use search_result::RetrievedChunk;
