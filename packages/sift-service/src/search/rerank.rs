use std::{collections::HashMap, sync::Arc, time::Duration};

use tracing::{debug, warn};

use sift_config::SearchRerank;
use sift_domain::text;

use crate::{RelevanceProvider, search::Candidate};

/// Language-model re-rank over the top lexical candidates, raced against the
/// configured budget. A lost race, a failed call, or an empty mapping all
/// degrade to the deterministic term-density fallback for the whole batch.
pub(crate) async fn apply(
	provider: &Arc<dyn RelevanceProvider>,
	cfg: &SearchRerank,
	query: &str,
	terms: &[String],
	candidates: &mut [Candidate],
) {
	if candidates.is_empty() {
		return;
	}

	let batch = cfg.batch_size.min(candidates.len());
	let excerpts = candidates[..batch]
		.iter()
		.map(|c| {
			(c.document.id.to_string(), text::excerpt(&c.document.text, cfg.excerpt_chars).to_string())
		})
		.collect::<Vec<_>>();

	match race(provider.clone(), query.to_string(), excerpts, Duration::from_millis(cfg.budget_ms))
		.await
	{
		Some(scores) if !scores.is_empty() => {
			debug!(batch, scored = scores.len(), "Re-rank scores applied.");

			for candidate in candidates[..batch].iter_mut() {
				candidate.llm = scores.get(&candidate.document.id.to_string()).copied();
			}
		},
		_ => {
			debug!(batch, "Re-rank unavailable; applying term-density fallback.");

			for candidate in candidates[..batch].iter_mut() {
				candidate.llm =
					Some(text::term_density_score(&candidate.document.text, terms, cfg.excerpt_chars));
			}
		},
	}
}

/// First-resolved wins. On timeout the in-flight call keeps running on its
/// own task and the eventual result is discarded.
async fn race(
	provider: Arc<dyn RelevanceProvider>,
	query: String,
	excerpts: Vec<(String, String)>,
	budget: Duration,
) -> Option<HashMap<String, u32>> {
	let call =
		tokio::spawn(async move { provider.relevance_scores(&query, &excerpts).await });

	match tokio::time::timeout(budget, call).await {
		Ok(Ok(Ok(scores))) => Some(scores),
		Ok(Ok(Err(err))) => {
			debug!(error = %err, "Re-rank call failed.");

			None
		},
		Ok(Err(err)) => {
			warn!(error = %err, "Re-rank task panicked.");

			None
		},
		Err(_) => {
			debug!(budget_ms = budget.as_millis() as u64, "Re-rank budget elapsed.");

			None
		},
	}
}
