mod filter;
mod fusion;
mod lexical;
mod rerank;
mod semantic;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use sift_domain::{Document, text};

use crate::{ScoredDocument, ServiceError, ServiceResult, SiftService};

/// Characters of extracted text returned with each result.
const DISPLAY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	pub limit: Option<u32>,
	pub page: Option<u32>,
	pub min_score: Option<f32>,
	pub folder: Option<String>,
	pub filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilters {
	pub date_range: Option<sift_domain::DateRange>,
	pub file_types: Vec<String>,
	pub tags: Vec<String>,
	pub authors: Vec<String>,
	pub size_range: Option<sift_domain::SizeRange>,
	pub workspace: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchResponse {
	pub results: Vec<SearchResult>,
	/// Matches above the score threshold before pagination.
	pub total: usize,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub id: Uuid,
	pub original_name: String,
	pub folder: Option<String>,
	pub mime_type: String,
	pub size: u64,
	pub tags: Vec<String>,
	pub uploaded_by: String,
	#[serde(with = "sift_domain::time_serde")]
	pub created_at: OffsetDateTime,
	pub extracted_text_excerpt: String,
	pub relevance_score: f32,
	pub base_score: f32,
	pub semantic_score: f32,
	pub llm_score: Option<u32>,
}

/// A retrieved document moving through the scoring stages.
#[derive(Debug)]
pub(crate) struct Candidate {
	pub(crate) document: Document,
	pub(crate) native_score: Option<f32>,
	pub(crate) lexical: f32,
	pub(crate) semantic: f32,
	pub(crate) llm: Option<u32>,
	pub(crate) combined: f32,
}

impl Candidate {
	fn from_scored(scored: ScoredDocument) -> Self {
		Self {
			document: scored.document,
			native_score: scored.native_score,
			lexical: 0.,
			semantic: 0.,
			llm: None,
			combined: 0.,
		}
	}

	fn from_document(document: Document) -> Self {
		Self { document, native_score: None, lexical: 0., semantic: 0., llm: None, combined: 0. }
	}
}

impl SiftService {
	pub async fn search(&self, req: SearchRequest) -> ServiceResult<SearchResponse> {
		let query = req.query.trim().to_string();

		if query.is_empty() {
			return Err(invalid("query must not be empty"));
		}

		let paging = self.cfg.search.paging;
		let limit = req.limit.unwrap_or(paging.default_limit);

		if limit == 0 || limit > paging.max_limit {
			return Err(invalid(&format!("limit must be between 1 and {}", paging.max_limit)));
		}

		let page = req.page.unwrap_or(1);

		if page == 0 {
			return Err(invalid("page must be at least 1"));
		}

		let min_score = req.min_score.unwrap_or(0.);

		if !(0. ..=1.).contains(&min_score) {
			return Err(invalid("minScore must be between 0 and 1"));
		}

		let doc_filter = filter::build(req.folder, req.filters)?;
		let terms = text::query_terms(&query);
		// The pool must cover every page plus headroom for threshold filtering,
		// otherwise `total` undercounts.
		let pool = paging.max_limit as usize * 4;
		let mut candidates =
			lexical::retrieve(self.store.as_ref(), &query, &terms, &doc_filter, pool).await?;

		debug!(stage = "retrieve", candidates = candidates.len(), "Retrieved candidates.");

		lexical::score(&mut candidates, &terms);

		debug!(stage = "lexical", candidates = candidates.len(), "Scored lexical relevance.");

		semantic::score(self.providers.embedding.as_ref(), &query, &mut candidates).await;

		debug!(
			stage = "semantic",
			with_embedding =
				candidates.iter().filter(|c| c.document.embedding.is_some()).count(),
			"Scored semantic similarity."
		);

		rerank::apply(&self.providers.relevance, &self.cfg.search.rerank, &query, &terms, &mut candidates)
			.await;
		fusion::combine(&self.cfg.search.fusion, &mut candidates);

		debug!(stage = "fusion", candidates = candidates.len(), "Fused stage scores.");

		let passing =
			candidates.into_iter().filter(|c| c.combined >= min_score).collect::<Vec<_>>();
		let total = passing.len();
		let skip = (page - 1) as usize * limit as usize;
		let results = passing
			.into_iter()
			.skip(skip)
			.take(limit as usize)
			.map(into_result)
			.collect::<Vec<_>>();

		debug!(stage = "respond", total, returned = results.len(), "Search completed.");

		Ok(SearchResponse { results, total })
	}
}

fn invalid(message: &str) -> ServiceError {
	ServiceError::InvalidRequest { message: message.to_string() }
}

fn into_result(candidate: Candidate) -> SearchResult {
	let Candidate { document, lexical, semantic, llm, combined, .. } = candidate;

	SearchResult {
		id: document.id,
		original_name: document.name,
		folder: document.folder,
		mime_type: document.mime_type,
		size: document.size,
		tags: document.tags,
		uploaded_by: document.uploaded_by,
		created_at: document.created_at,
		extracted_text_excerpt: text::excerpt(&document.text, DISPLAY_EXCERPT_CHARS).to_string(),
		relevance_score: combined,
		base_score: lexical,
		semantic_score: semantic,
		llm_score: llm,
	}
}
