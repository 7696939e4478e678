use regex::Regex;
use tracing::debug;

use sift_domain::{DocumentFilter, text};

use crate::{DocumentStore, ServiceResult, search::Candidate};

/// Primary ranked retrieval, falling back to an OR-regex scan over the terms
/// when the full-text backend finds nothing.
pub(crate) async fn retrieve(
	store: &dyn DocumentStore,
	query: &str,
	terms: &[String],
	filter: &DocumentFilter,
	limit: usize,
) -> ServiceResult<Vec<Candidate>> {
	let scored = store.search_text(query, filter, limit).await?;

	if !scored.is_empty() {
		return Ok(scored.into_iter().map(Candidate::from_scored).collect());
	}

	let Some(pattern) = fallback_pattern(terms) else {
		return Ok(Vec::new());
	};

	debug!(%pattern, "Full-text search empty; falling back to regex scan.");

	let docs = store.search_regex(&pattern, filter, limit).await?;

	Ok(docs.into_iter().map(Candidate::from_document).collect())
}

/// Case-insensitive alternation over the escaped query terms.
pub(crate) fn fallback_pattern(terms: &[String]) -> Option<Regex> {
	if terms.is_empty() {
		return None;
	}

	let alternation =
		terms.iter().map(|term| regex::escape(term)).collect::<Vec<_>>().join("|");

	Regex::new(&format!("(?i)({alternation})")).ok()
}

/// Lexical score per candidate, preferring the store's native score over the
/// computed term-frequency sum, then normalized by the batch maximum.
pub(crate) fn score(candidates: &mut [Candidate], terms: &[String]) {
	for candidate in candidates.iter_mut() {
		candidate.lexical = candidate
			.native_score
			.unwrap_or_else(|| text::term_frequency(&candidate.document.text, terms));
	}

	let max = candidates.iter().map(|c| c.lexical).fold(0_f32, f32::max);

	if max > 0. {
		for candidate in candidates.iter_mut() {
			candidate.lexical /= max;
		}
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;
	use uuid::Uuid;

	use sift_domain::Document;

	use super::*;

	fn candidate(text: &str, native: Option<f32>) -> Candidate {
		Candidate::from_scored(crate::ScoredDocument {
			document: Document {
				id: Uuid::new_v4(),
				name: "doc".to_string(),
				folder: None,
				mime_type: "text/plain".to_string(),
				size: text.len() as u64,
				tags: Vec::new(),
				uploaded_by: "ana".to_string(),
				created_at: datetime!(2025-06-01 00:00 UTC),
				text: text.to_string(),
				embedding: None,
			},
			native_score: native,
		})
	}

	#[test]
	fn fallback_pattern_escapes_metacharacters() {
		let pattern = fallback_pattern(&["c++".to_string(), "net".to_string()]).unwrap();

		assert!(pattern.is_match("learning C++ basics"));
		assert!(pattern.is_match("NETWORK"));
		assert!(!pattern.is_match("unrelated"));
	}

	#[test]
	fn fallback_pattern_of_no_terms_is_none() {
		assert!(fallback_pattern(&[]).is_none());
	}

	#[test]
	fn native_score_wins_over_term_frequency() {
		let mut candidates =
			vec![candidate("net net net", Some(2.)), candidate("net net net net", None)];

		score(&mut candidates, &["net".to_string()]);

		// 2.0 native and 4.0 computed, normalized by 4.
		assert_eq!(candidates[0].lexical, 0.5);
		assert_eq!(candidates[1].lexical, 1.);
	}

	#[test]
	fn all_zero_scores_stay_zero() {
		let mut candidates = vec![candidate("nothing relevant", None)];

		score(&mut candidates, &["quantum".to_string()]);

		assert_eq!(candidates[0].lexical, 0.);
	}
}
