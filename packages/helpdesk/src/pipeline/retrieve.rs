//! Knowledge retrieval.
//!
//! Chunks tagged with the classified category are searched first. When they
//! fill fewer than `top_k` slots, the rest of the index is searched for the
//! remaining slots. Category matches are never displaced by equally scored
//! chunks from outside the category.

use tracing::{debug, warn};

use crate::index::KnowledgeIndex;
use crate::traits::ai::EmbeddingModel;
use crate::types::knowledge::RetrievedItem;
use crate::types::response::RetrievalMode;

/// Retrieve knowledge for `query`, preferring chunks tagged `category`.
///
/// When the query cannot be embedded, ranks by keyword overlap instead.
pub async fn retrieve<E>(
    embedder: &E,
    index: &KnowledgeIndex,
    query: &str,
    category: &str,
    top_k: usize,
    threshold: f32,
) -> (Vec<RetrievedItem>, RetrievalMode)
where
    E: EmbeddingModel + ?Sized,
{
    match embedder.embed(query).await {
        Ok(query_embedding) => {
            let items = category_first(index, category, top_k, |candidates, k| {
                index.search(&query_embedding, candidates, k, threshold)
            });
            debug!(
                category = %category,
                results = items.len(),
                "Retrieved knowledge"
            );
            (items, RetrievalMode::Semantic)
        }
        Err(e) => {
            warn!(error = %e, "Query embedding failed, using keyword retrieval");
            let items = category_first(index, category, top_k, |candidates, k| {
                index.keyword_search(query, candidates, k, threshold)
            });
            (items, RetrievalMode::Keyword)
        }
    }
}

/// Apply the category-first widening policy with any ranking function.
pub fn category_first<F>(
    index: &KnowledgeIndex,
    category: &str,
    top_k: usize,
    search: F,
) -> Vec<RetrievedItem>
where
    F: Fn(&[usize], usize) -> Vec<RetrievedItem>,
{
    if top_k == 0 {
        return Vec::new();
    }

    let mut items = search(&index.tagged(category), top_k);
    if items.len() >= top_k {
        return items;
    }

    let missing = top_k - items.len();
    let wider = search(&index.untagged(category), missing);
    if !wider.is_empty() {
        debug!(
            category = %category,
            in_category = items.len(),
            widened = wider.len(),
            "Widened retrieval beyond category"
        );
    }

    // Category items come first, so the stable sort keeps them ahead on ties
    items.extend(wider);
    items.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    items.truncate(top_k);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;
    use crate::types::knowledge::RawChunk;

    fn chunk(id: &str, category: &str, embedding: Vec<f32>) -> crate::types::knowledge::KnowledgeChunk {
        RawChunk::new(id, format!("{id} text"), "kb.md", category).embedded(embedding)
    }

    fn index() -> KnowledgeIndex {
        KnowledgeIndex::from_chunks(vec![
            chunk("net-1", "network_connectivity", vec![1.0, 0.0]),
            chunk("pw-1", "password_reset", vec![1.0, 0.0]),
            chunk("pw-2", "password_reset", vec![0.6, 0.8]),
            chunk("pw-3", "password_reset", vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    fn ids(items: &[RetrievedItem]) -> Vec<&str> {
        items.iter().map(|i| i.chunk_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_category_fills_all_slots() {
        let ai = MockAI::new().with_embedding("reset", vec![1.0, 0.0]);
        let (items, mode) = retrieve(&ai, &index(), "reset", "password_reset", 2, 0.5).await;

        assert_eq!(mode, RetrievalMode::Semantic);
        assert_eq!(ids(&items), vec!["pw-1", "pw-2"]);
    }

    #[tokio::test]
    async fn test_category_wins_ties() {
        let ai = MockAI::new().with_embedding("reset", vec![1.0, 0.0]);
        let (items, _) = retrieve(&ai, &index(), "reset", "password_reset", 4, 0.5).await;

        // net-1 scores the same as pw-1 but is inserted earlier
        assert_eq!(ids(&items), vec!["pw-1", "net-1", "pw-2"]);
    }

    #[tokio::test]
    async fn test_widens_when_category_has_no_chunks() {
        let ai = MockAI::new().with_embedding("printer", vec![1.0, 0.0]);
        let (items, _) = retrieve(&ai, &index(), "printer", "hardware_failure", 3, 0.5).await;

        assert_eq!(ids(&items), vec!["net-1", "pw-1", "pw-2"]);
    }

    #[tokio::test]
    async fn test_nothing_clears_threshold() {
        let ai = MockAI::new().with_embedding("odd", vec![-1.0, 0.0]);
        let (items, _) = retrieve(&ai, &index(), "odd", "password_reset", 3, 0.5).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_retrieval_when_embedding_fails() {
        let ai = MockAI::new().failing_embeddings();
        let index = KnowledgeIndex::from_chunks(vec![
            RawChunk::new("vpn", "Connect to the VPN with GlobalProtect", "kb.md", "network_connectivity")
                .embedded(vec![1.0]),
            RawChunk::new("pw", "Reset your password at the portal", "kb.md", "password_reset")
                .embedded(vec![1.0]),
        ])
        .unwrap();

        let (items, mode) = retrieve(&ai, &index, "vpn globalprotect", "password_reset", 3, 0.5).await;

        assert_eq!(mode, RetrievalMode::Keyword);
        assert_eq!(ids(&items), vec!["vpn"]);
    }

    #[test]
    fn test_zero_top_k() {
        let index = index();
        let items = category_first(&index, "password_reset", 0, |c, k| {
            index.search(&[1.0, 0.0], c, k, 0.0)
        });
        assert!(items.is_empty());
    }
}
