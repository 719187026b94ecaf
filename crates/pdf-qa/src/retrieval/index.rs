//! In-memory vector index with exact cosine search

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`, higher is better
    pub similarity: f32,
}

/// A chunk paired with its embedding
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Exact nearest-neighbour index over one document's chunks
///
/// Built once per upload and never mutated afterwards. A new upload builds a
/// new index that replaces the old one wholesale.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Pair chunks with embeddings by position
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::SizeMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: bad.len(),
            });
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self { entries, dimension })
    }

    /// Return up to `k` chunks ranked by descending similarity to `query`
    ///
    /// Equal scores keep document order. `k` larger than the index is clamped.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.vector), entry))
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.chunk.sequence_index.cmp(&b.chunk.sequence_index))
        });

        Ok(scored
            .into_iter()
            .take(k.min(self.entries.len()))
            .map(|(similarity, entry)| SearchResult {
                chunk: entry.chunk.clone(),
                similarity,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension; 0 for an empty index
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity; 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk(seq: u32, text: &str) -> Chunk {
        Chunk::new(text.to_string(), 1, seq, 0, text.chars().count())
    }

    fn index(vectors: Vec<Vec<f32>>) -> VectorIndex {
        let chunks = (0..vectors.len())
            .map(|i| chunk(i as u32, &format!("chunk {}", i)))
            .collect();
        VectorIndex::build(chunks, vectors).unwrap()
    }

    #[test]
    fn test_build_size_mismatch() {
        let result = VectorIndex::build(vec![chunk(0, "a"), chunk(1, "b")], vec![vec![1.0, 0.0]]);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                chunks: 2,
                embeddings: 1
            })
        ));
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let result = VectorIndex::build(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_ranked_by_similarity() {
        let idx = index(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]]);
        let results = idx.retrieve(&[1.0, 0.1], 2).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.sequence_index, 1);
        assert_eq!(results[1].chunk.sequence_index, 2);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_ties_keep_document_order() {
        let idx = index(vec![vec![1.0, 0.0], vec![2.0, 0.0], vec![0.5, 0.0]]);
        let results = idx.retrieve(&[1.0, 0.0], 3).unwrap();
        let order: Vec<u32> = results.iter().map(|r| r.chunk.sequence_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_larger_than_index_is_clamped() {
        let idx = index(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let results = idx.retrieve(&[1.0, 1.0], 4).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let idx = VectorIndex::build(Vec::new(), Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert_eq!(idx.dimension(), 0);
        assert!(idx.retrieve(&[1.0, 2.0, 3.0], 4).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let idx = index(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            idx.retrieve(&[1.0, 0.0, 0.0], 4),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_zero_norm_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[3.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_retrieve_clamps_and_ranks(
            vectors in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 3), 1..20),
            query in proptest::collection::vec(-1.0f32..1.0, 3),
            extra in 0usize..10,
        ) {
            let len = vectors.len();
            let idx = index(vectors);
            let results = idx.retrieve(&query, len + extra).unwrap();

            prop_assert_eq!(results.len(), len);
            for pair in results.windows(2) {
                prop_assert!(pair[0].similarity >= pair[1].similarity);
            }
        }
    }
}
