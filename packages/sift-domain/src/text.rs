/// Lowercased whitespace-split query terms, empty terms dropped.
///
/// Duplicate terms are kept on purpose: a repeated term counts twice toward
/// term frequency, matching how the store-side relevance treats it.
pub fn query_terms(query: &str) -> Vec<String> {
	query.split_whitespace().map(|term| term.to_lowercase()).filter(|t| !t.is_empty()).collect()
}

/// Non-overlapping substring occurrences of every term, summed over `text`.
pub fn term_frequency(text: &str, terms: &[String]) -> f32 {
	if terms.is_empty() || text.is_empty() {
		return 0.0;
	}

	let haystack = text.to_lowercase();

	terms.iter().map(|term| haystack.matches(term.as_str()).count()).sum::<usize>() as f32
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}

/// Deterministic re-rank fallback: term occurrences per excerpt character,
/// scaled to the 0-100 range the language model would have produced.
///
/// The scale factor of 1,000 reads as "occurrences per thousand characters",
/// capped at 100 so dense short excerpts cannot overflow the score range.
pub fn term_density_score(text: &str, terms: &[String], excerpt_chars: usize) -> u32 {
	let snippet = excerpt(text, excerpt_chars);
	let len = snippet.chars().count();

	if len == 0 {
		return 0;
	}

	let occurrences = term_frequency(snippet, terms);
	let density = occurrences / len as f32;

	(density * 1_000.0).round().clamp(0.0, 100.0) as u32
}
