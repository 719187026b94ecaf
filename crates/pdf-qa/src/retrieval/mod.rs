//! Retrieval over an in-memory vector index

mod index;

pub use index::{cosine_similarity, IndexEntry, SearchResult, VectorIndex};
