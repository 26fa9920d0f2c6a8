//! The knowledge index: embedded chunks answering similarity queries.

use std::collections::HashSet;

use tracing::info;

use super::similarity::{keyword_overlap, relevance};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::traits::ai::EmbeddingModel;
use crate::types::knowledge::{KnowledgeChunk, RawChunk, RetrievedItem};

/// Immutable collection of embedded knowledge chunks.
///
/// All embeddings share one dimension. Chunk order is insertion order and is
/// the tie-break for equal scores.
#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    chunks: Vec<KnowledgeChunk>,
    dimension: usize,
}

impl KnowledgeIndex {
    /// Embed `raw_chunks` and build an index over them.
    ///
    /// Fails on an empty input, duplicate ids, provider errors, or embeddings
    /// that are empty or disagree on dimension.
    pub async fn build<E>(raw_chunks: Vec<RawChunk>, embedder: &E) -> Result<Self>
    where
        E: EmbeddingModel + ?Sized,
    {
        if raw_chunks.is_empty() {
            return Err(ConfigError::EmptyKnowledgeBase.into());
        }
        check_unique_ids(raw_chunks.iter().map(|c| c.id.as_str()))?;

        let texts: Vec<&str> = raw_chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != raw_chunks.len() {
            return Err(ConfigError::EmbeddingCount {
                expected: raw_chunks.len(),
                found: embeddings.len(),
            }
            .into());
        }

        let chunks = raw_chunks
            .into_iter()
            .zip(embeddings)
            .map(|(raw, embedding)| raw.embedded(embedding))
            .collect();

        Ok(Self::from_chunks(chunks)?)
    }

    /// Build an index from chunks that already carry embeddings.
    pub fn from_chunks(chunks: Vec<KnowledgeChunk>) -> ConfigResult<Self> {
        let first = chunks.first().ok_or(ConfigError::EmptyKnowledgeBase)?;
        let dimension = first.embedding.len();

        check_unique_ids(chunks.iter().map(|c| c.id.as_str()))?;

        for chunk in &chunks {
            if chunk.embedding.is_empty() {
                return Err(ConfigError::EmptyEmbedding {
                    id: chunk.id.clone(),
                });
            }
            if chunk.embedding.len() != dimension {
                return Err(ConfigError::DimensionMismatch {
                    id: chunk.id.clone(),
                    expected: dimension,
                    found: chunk.embedding.len(),
                });
            }
        }

        info!(chunks = chunks.len(), dimension, "Built knowledge index");

        Ok(Self { chunks, dimension })
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a built index.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimension shared by every chunk.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Chunks in insertion order.
    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    /// Positions of chunks tagged with `category`.
    pub fn tagged(&self, category: &str) -> Vec<usize> {
        self.positions(|c| c.has_tag(category))
    }

    /// Positions of chunks not tagged with `category`.
    pub fn untagged(&self, category: &str) -> Vec<usize> {
        self.positions(|c| !c.has_tag(category))
    }

    /// Positions of every chunk.
    pub fn all(&self) -> Vec<usize> {
        (0..self.chunks.len()).collect()
    }

    /// Number of chunks tagged with `category`.
    pub fn count_tagged(&self, category: &str) -> usize {
        self.chunks.iter().filter(|c| c.has_tag(category)).count()
    }

    /// Rank `candidates` by cosine similarity to `query_embedding`.
    ///
    /// Keeps scores `>= threshold`, sorts descending with ties in candidate
    /// order, and returns at most `top_k` items. Out-of-range positions are
    /// ignored.
    pub fn search(
        &self,
        query_embedding: &[f32],
        candidates: &[usize],
        top_k: usize,
        threshold: f32,
    ) -> Vec<RetrievedItem> {
        self.rank(candidates, top_k, threshold, |chunk| {
            relevance(query_embedding, &chunk.embedding)
        })
    }

    /// Rank `candidates` by term overlap with `query`.
    ///
    /// Same filtering and ordering rules as [`search`](Self::search).
    pub fn keyword_search(
        &self,
        query: &str,
        candidates: &[usize],
        top_k: usize,
        threshold: f32,
    ) -> Vec<RetrievedItem> {
        self.rank(candidates, top_k, threshold, |chunk| {
            keyword_overlap(query, &chunk.content)
        })
    }

    fn rank<F>(&self, candidates: &[usize], top_k: usize, threshold: f32, score: F) -> Vec<RetrievedItem>
    where
        F: Fn(&KnowledgeChunk) -> f32,
    {
        if top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &KnowledgeChunk)> = candidates
            .iter()
            .filter_map(|&i| self.chunks.get(i))
            .map(|chunk| (score(chunk), chunk))
            .filter(|(s, _)| *s >= threshold)
            .collect();

        // sort_by is stable: equal scores keep candidate order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(s, chunk)| RetrievedItem::from_chunk(chunk, s))
            .collect()
    }

    fn positions<F>(&self, keep: F) -> Vec<usize>
    where
        F: Fn(&KnowledgeChunk) -> bool,
    {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| keep(c))
            .map(|(i, _)| i)
            .collect()
    }
}

fn check_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateChunk { id: id.to_string() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HelpdeskError;
    use crate::testing::MockAI;
    use proptest::prelude::*;

    fn chunk(id: &str, category: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        RawChunk::new(id, format!("content of {id}"), "test.md", category).embedded(embedding)
    }

    fn sample_index() -> KnowledgeIndex {
        KnowledgeIndex::from_chunks(vec![
            chunk("a", "password_reset", vec![1.0, 0.0, 0.0]),
            chunk("b", "password_reset", vec![0.8, 0.6, 0.0]),
            chunk("c", "network_connectivity", vec![0.0, 1.0, 0.0]),
            chunk("d", "network_connectivity", vec![1.0, 0.0, 0.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_chunks_validation() {
        assert_eq!(
            KnowledgeIndex::from_chunks(Vec::new()).unwrap_err(),
            ConfigError::EmptyKnowledgeBase
        );

        let err = KnowledgeIndex::from_chunks(vec![
            chunk("a", "x", vec![1.0, 0.0]),
            chunk("a", "x", vec![0.0, 1.0]),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateChunk { id: "a".to_string() });

        let err = KnowledgeIndex::from_chunks(vec![
            chunk("a", "x", vec![1.0, 0.0]),
            chunk("b", "x", vec![0.0, 1.0, 0.0]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DimensionMismatch {
                id: "b".to_string(),
                expected: 2,
                found: 3
            }
        );

        let err = KnowledgeIndex::from_chunks(vec![chunk("a", "x", Vec::new())]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyEmbedding { id: "a".to_string() });
    }

    #[test]
    fn test_self_match_scores_one() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.0, 0.0], &index.all(), 1, 0.0);
        assert_eq!(results.len(), 1);
        assert!((results[0].relevance_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.0, 0.0], &index.all(), 4, 0.5);

        let ids: Vec<_> = results.iter().map(|r| r.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "b"]);
    }

    #[test]
    fn test_search_respects_candidates_and_threshold() {
        let index = sample_index();
        let tagged = index.tagged("network_connectivity");
        assert_eq!(tagged, vec![2, 3]);

        let results = index.search(&[0.0, 1.0, 0.0], &tagged, 3, 0.9);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk_id, "c");

        assert!(index.search(&[0.0, 0.0, 1.0], &index.all(), 3, 0.1).is_empty());
        assert!(index.search(&[1.0, 0.0, 0.0], &index.all(), 0, 0.0).is_empty());
    }

    #[test]
    fn test_zero_query_returns_nothing_above_zero() {
        let index = sample_index();
        assert!(index.search(&[0.0, 0.0, 0.0], &index.all(), 3, 0.01).is_empty());
    }

    #[tokio::test]
    async fn test_build_embeds_every_chunk() {
        let ai = MockAI::new();
        let raw = vec![
            RawChunk::new("1", "Reset your password", "kb.md", "password_reset"),
            RawChunk::new("2", "Connect to the VPN", "kb.md", "network_connectivity"),
        ];

        let index = KnowledgeIndex::build(raw, &ai).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), MockAI::EMBEDDING_DIM);
        assert_eq!(ai.embed_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_build_rejects_empty() {
        let ai = MockAI::new();
        let result = KnowledgeIndex::build(Vec::new(), &ai).await;
        assert!(matches!(
            result,
            Err(HelpdeskError::Config(ConfigError::EmptyKnowledgeBase))
        ));
        assert!(ai.embed_calls().is_empty());
    }

    #[tokio::test]
    async fn test_build_propagates_provider_failure() {
        let ai = MockAI::new().failing_embeddings();
        let raw = vec![RawChunk::new("1", "text", "kb.md", "x")];
        assert!(KnowledgeIndex::build(raw, &ai).await.is_err());
    }

    #[tokio::test]
    async fn test_rebuild_is_deterministic() {
        let ai = MockAI::new();
        let raw = vec![
            RawChunk::new("1", "Reset your password", "kb.md", "password_reset"),
            RawChunk::new("2", "Connect to the VPN", "kb.md", "network_connectivity"),
            RawChunk::new("3", "Install software", "kb.md", "software_installation"),
        ];

        let first = KnowledgeIndex::build(raw.clone(), &ai).await.unwrap();
        let second = KnowledgeIndex::build(raw, &ai).await.unwrap();
        let query = ai.embed("how do I reset my password").await.unwrap();

        assert_eq!(
            first.search(&query, &first.all(), 3, 0.0),
            second.search(&query, &second.all(), 3, 0.0)
        );
    }

    proptest! {
        #[test]
        fn search_is_sorted_and_bounded(
            embeddings in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..20),
            query in prop::collection::vec(-1.0f32..1.0, 4),
            top_k in 0usize..8,
            threshold in 0.0f32..1.0,
        ) {
            let chunks = embeddings
                .into_iter()
                .enumerate()
                .map(|(i, e)| chunk(&i.to_string(), "x", e))
                .collect();
            let index = KnowledgeIndex::from_chunks(chunks).unwrap();
            let results = index.search(&query, &index.all(), top_k, threshold);

            prop_assert!(results.len() <= top_k);
            for item in &results {
                prop_assert!(item.relevance_score >= threshold);
                prop_assert!(item.relevance_score <= 1.0);
            }
            for pair in results.windows(2) {
                prop_assert!(pair[0].relevance_score >= pair[1].relevance_score);
            }
        }
    }
}
