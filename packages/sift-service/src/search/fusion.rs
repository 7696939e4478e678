use std::cmp::Ordering;

use sift_config::SearchFusion;

use crate::search::Candidate;

/// Weighted score fusion. Candidates carrying a language-model score use the
/// three-way weights; the rest fall back to the two-way split. Combined
/// scores are rounded to four decimals and the batch is sorted descending,
/// ties keeping their retrieval order.
pub(crate) fn combine(cfg: &SearchFusion, candidates: &mut [Candidate]) {
	for candidate in candidates.iter_mut() {
		let combined = match candidate.llm {
			Some(llm) =>
				cfg.lexical_weight * candidate.lexical
					+ cfg.semantic_weight * candidate.semantic
					+ cfg.llm_weight * (llm as f32 / 100.),
			None =>
				cfg.lexical_only_weight * candidate.lexical
					+ cfg.semantic_only_weight * candidate.semantic,
		};

		candidate.combined = round4(combined.clamp(0., 1.));
	}

	// `sort_by` is stable, which is what keeps ties in retrieval order.
	candidates.sort_by(|a, b| cmp_desc(a.combined, b.combined));
}

fn round4(value: f32) -> f32 {
	(value * 10_000.).round() / 10_000.
}

fn cmp_desc(a: f32, b: f32) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
