//! Document ingestion: sources and word chunking

mod chunker;
pub mod source;

pub use chunker::WordChunker;
pub use source::{extract_paragraph_text, DocumentSource, StaticSource, WebPageSource};
