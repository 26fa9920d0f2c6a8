//! Scoring functions for knowledge retrieval.

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Returns 0.0 for mismatched lengths, empty or zero-magnitude vectors, and
/// anything that would not produce a finite number.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Relevance score in `[0, 1]`: cosine similarity with negatives clamped.
pub fn relevance(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity(a, b).clamp(0.0, 1.0)
}

/// Fraction of query terms that appear in `text`.
///
/// Terms shorter than three characters are ignored.
pub fn keyword_overlap(query: &str, text: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let query_terms: Vec<&str> = query_lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| w.chars().count() > 2)
        .collect();

    if query_terms.is_empty() {
        return 0.0;
    }

    let text_lower = text.to_lowercase();
    let matches = query_terms
        .iter()
        .filter(|term| text_lower.contains(*term))
        .count();

    matches as f32 / query_terms.len() as f32
}
