//! Object storage for uploaded source documents.

mod source_key;
mod source_reader;
mod source_store;

pub use source_key::SourceKey;
pub use source_reader::SourceReader;
pub use source_store::{SourceStore, StoredSource};
