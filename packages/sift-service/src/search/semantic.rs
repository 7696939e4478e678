use sift_domain::similarity;

use crate::{EmbeddingProvider, search::Candidate};

/// Cosine similarity between the query embedding and each stored document
/// embedding, normalized by the batch maximum. Candidates without an
/// embedding, and the whole batch when the query embedding is unavailable,
/// score zero.
pub(crate) async fn score(
	embedding: &dyn EmbeddingProvider,
	query: &str,
	candidates: &mut [Candidate],
) {
	if candidates.is_empty() {
		return;
	}

	let query_vec = embedding.embed(query).await;

	if query_vec.is_empty() {
		return;
	}

	for candidate in candidates.iter_mut() {
		candidate.semantic = candidate
			.document
			.embedding
			.as_deref()
			.map(|stored| similarity::cosine(stored, &query_vec))
			.unwrap_or(0.);
	}

	let max = candidates.iter().map(|c| c.semantic).fold(0_f32, f32::max);

	if max > 0. {
		for candidate in candidates.iter_mut() {
			// Negative similarity reads as "no signal" after normalization.
			candidate.semantic = (candidate.semantic / max).max(0.);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use time::macros::datetime;
	use uuid::Uuid;

	use sift_domain::Document;

	use crate::BoxFuture;

	use super::*;

	struct FixedEmbedding(Vec<f32>);

	impl EmbeddingProvider for FixedEmbedding {
		fn embed<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Vec<f32>> {
			Box::pin(async move { self.0.clone() })
		}
	}

	fn candidate(embedding: Option<Vec<f32>>) -> Candidate {
		Candidate::from_document(Document {
			id: Uuid::new_v4(),
			name: "doc".to_string(),
			folder: None,
			mime_type: "text/plain".to_string(),
			size: 0,
			tags: Vec::new(),
			uploaded_by: "ana".to_string(),
			created_at: datetime!(2025-06-01 00:00 UTC),
			text: String::new(),
			embedding,
		})
	}

	#[tokio::test]
	async fn unavailable_query_embedding_leaves_zeroes() {
		let provider = Arc::new(FixedEmbedding(Vec::new()));
		let mut candidates = vec![candidate(Some(vec![1., 0.]))];

		score(provider.as_ref(), "query", &mut candidates).await;

		assert_eq!(candidates[0].semantic, 0.);
	}

	#[tokio::test]
	async fn similarity_is_normalized_by_batch_maximum() {
		let provider = Arc::new(FixedEmbedding(vec![1., 0.]));
		let mut candidates = vec![
			candidate(Some(vec![1., 0.])),
			candidate(Some(vec![1., 1.])),
			candidate(None),
		];

		score(provider.as_ref(), "query", &mut candidates).await;

		assert_eq!(candidates[0].semantic, 1.);
		assert!(candidates[1].semantic > 0.7 && candidates[1].semantic < 0.71);
		assert_eq!(candidates[2].semantic, 0.);
	}

	#[tokio::test]
	async fn mismatched_dimensions_score_zero() {
		let provider = Arc::new(FixedEmbedding(vec![1., 0., 0.]));
		let mut candidates = vec![candidate(Some(vec![1., 0.]))];

		score(provider.as_ref(), "query", &mut candidates).await;

		assert_eq!(candidates[0].semantic, 0.);
	}
}
