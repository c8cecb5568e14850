//! Cosine similarity calculations

use ndarray::ArrayView1;
use tracing::debug;

use crate::types::SimilarityMatch;

/// Calculate cosine similarity between two embeddings
///
/// Returns a value between -1.0 (opposite) and 1.0 (identical)
///
/// Formula: cos(θ) = (A · B) / (||A|| ||B||)
/// where:
/// - A · B is the dot product
/// - ||A|| and ||B|| are the magnitudes (L2 norms)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Embeddings must have same dimension (got {} and {})",
        a.len(),
        b.len()
    );

    let a_view = ArrayView1::from(a);
    let b_view = ArrayView1::from(b);

    let dot_product = a_view.dot(&b_view);
    let norm_a = a_view.dot(&a_view).sqrt();
    let norm_b = b_view.dot(&b_view).sqrt();

    // Avoid division by zero
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)) as f64
}

/// Find the top-K candidates most similar to a query embedding
///
/// # Arguments
/// * `query` - The query embedding vector
/// * `candidates` - Candidate embeddings, all with the query's dimension
/// * `top_k` - Maximum number of results to return
///
/// # Returns
/// Vector of SimilarityMatch sorted by score (highest first). Equal scores
/// keep candidate order.
pub fn find_similar<'a, I>(query: &[f32], candidates: I, top_k: usize) -> Vec<SimilarityMatch>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut matches: Vec<SimilarityMatch> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, embedding)| SimilarityMatch {
            index,
            score: cosine_similarity(query, embedding),
        })
        .collect();

    debug!("Ranking {} candidates, top_k={}", matches.len(), top_k);

    // Sort by score descending
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Limit to top_k
    matches.truncate(top_k);

    if let Some(best) = matches.first() {
        debug!("Top match: index={}, score={:.3}", best.index, best.score);
    }

    matches
}
