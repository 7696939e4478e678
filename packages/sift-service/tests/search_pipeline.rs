//! End-to-end exercises of the search pipeline against the in-memory store
//! and scripted providers.

use std::sync::Arc;

use sift_service::{
	Providers, SearchFilters, SearchRequest, ServiceError, SiftService,
};
use sift_store_memory::MemoryStore;
use sift_testkit::{DocumentBuilder, ScriptedEmbedding, ScriptedRelevance};

fn service(
	store: MemoryStore,
	embedding: ScriptedEmbedding,
	relevance: ScriptedRelevance,
) -> SiftService {
	service_with_cfg(sift_config::Config::default(), store, embedding, relevance)
}

fn service_with_cfg(
	cfg: sift_config::Config,
	store: MemoryStore,
	embedding: ScriptedEmbedding,
	relevance: ScriptedRelevance,
) -> SiftService {
	SiftService::with_providers(
		cfg,
		Arc::new(store),
		Providers::new(Arc::new(embedding), Arc::new(relevance)),
	)
}

fn request(query: &str) -> SearchRequest {
	SearchRequest { query: query.to_string(), ..SearchRequest::default() }
}

#[tokio::test]
async fn empty_query_is_rejected() {
	let service = service(
		MemoryStore::default(),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);

	assert!(matches!(
		service.search(request("   ")).await,
		Err(ServiceError::InvalidRequest { .. })
	));
}

#[tokio::test]
async fn out_of_range_paging_is_rejected() {
	let service = service(
		MemoryStore::default(),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);

	let over_limit = SearchRequest { limit: Some(51), ..request("anything") };

	assert!(matches!(
		service.search(over_limit).await,
		Err(ServiceError::InvalidRequest { .. })
	));

	let page_zero = SearchRequest { page: Some(0), ..request("anything") };

	assert!(matches!(
		service.search(page_zero).await,
		Err(ServiceError::InvalidRequest { .. })
	));

	let bad_score = SearchRequest { min_score: Some(1.5), ..request("anything") };

	assert!(matches!(
		service.search(bad_score).await,
		Err(ServiceError::InvalidRequest { .. })
	));
}

#[tokio::test]
async fn lexical_pipeline_ranks_by_fused_score() {
	let docs = vec![
		DocumentBuilder::new("guide.md")
			.text("network network network troubleshooting")
			.build(),
		DocumentBuilder::new("note.md").text("a single network mention").build(),
	];
	let guide_id = docs[0].id;
	let note_id = docs[1].id;
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::scores([(guide_id, 90), (note_id, 10)]),
	);

	let response = service.search(request("network")).await.unwrap();

	assert_eq!(response.total, 2);
	assert_eq!(response.results[0].id, guide_id);
	assert_eq!(response.results[0].llm_score, Some(90));
	// 0.4 * 1.0 lexical + 0.3 * 0 semantic + 0.3 * 0.9 llm.
	assert_eq!(response.results[0].relevance_score, 0.67);
	assert!(response.results[0].relevance_score > response.results[1].relevance_score);
}

#[tokio::test]
async fn regex_fallback_is_recency_ordered() {
	// The phrase never occurs verbatim, so the full-text pass comes back
	// empty and the term regex takes over.
	let docs = vec![
		DocumentBuilder::new("older.md")
			.text("network diagrams from last year")
			.created_days(1)
			.build(),
		DocumentBuilder::new("newer.md")
			.text("current connectivity report")
			.created_days(3)
			.build(),
		DocumentBuilder::new("unrelated.md").text("pasta recipes").created_days(5).build(),
	];
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);

	let response = service.search(request("connectivity network")).await.unwrap();

	assert_eq!(response.total, 2);
	assert_eq!(response.results[0].original_name, "newer.md");
	assert_eq!(response.results[1].original_name, "older.md");
}

#[tokio::test]
async fn pagination_reports_pre_page_total() {
	let mut docs = Vec::new();

	for idx in 0..14 {
		docs.push(
			DocumentBuilder::new(&format!("doc-{idx}.md"))
				.text("alpha reference material")
				.created_days(idx)
				.build(),
		);
	}

	// Twelve docs clear the threshold, two sink below it.
	let scores = docs
		.iter()
		.enumerate()
		.map(|(idx, doc)| (doc.id, if idx < 12 { 0.9 } else { 0.1 }))
		.collect::<Vec<_>>();
	let mut cfg = sift_config::Config::default();

	cfg.search.rerank.batch_size = 0;

	let service = service_with_cfg(
		cfg,
		MemoryStore::new(docs).with_native_scores(scores),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);
	let req = SearchRequest {
		limit: Some(10),
		page: Some(2),
		min_score: Some(0.5),
		..request("alpha")
	};
	let response = service.search(req).await.unwrap();

	assert_eq!(response.total, 12);
	assert_eq!(response.results.len(), 2);
}

#[tokio::test]
async fn empty_relevance_mapping_falls_back_to_term_density() {
	let docs = vec![DocumentBuilder::new("dense.md")
		.text("network network network network network")
		.build()];
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);

	let response = service.search(request("network")).await.unwrap();

	assert_eq!(response.results[0].llm_score.map(|s| s > 0), Some(true));
}

#[tokio::test]
async fn hung_relevance_call_degrades_within_budget() {
	let docs = vec![DocumentBuilder::new("doc.md").text("network basics").build()];
	let mut cfg = sift_config::Config::default();

	cfg.search.rerank.budget_ms = 50;

	let service = service_with_cfg(
		cfg,
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Hang,
	);

	let response = service.search(request("network")).await.unwrap();

	assert_eq!(response.total, 1);
	assert!(response.results[0].llm_score.is_some());
}

#[tokio::test]
async fn timeout_with_mixed_embeddings_scores_every_candidate() {
	let docs = vec![
		DocumentBuilder::new("with-vec-a.md")
			.text("network troubleshooting handbook")
			.embedding(vec![1., 0.])
			.build(),
		DocumentBuilder::new("with-vec-b.md")
			.text("advanced network troubleshooting stack")
			.embedding(vec![0.8, 0.2])
			.build(),
		DocumentBuilder::new("no-vec.md").text("network troubleshooting notes").build(),
	];
	let mut cfg = sift_config::Config::default();

	cfg.search.rerank.budget_ms = 50;

	let service = service_with_cfg(
		cfg,
		MemoryStore::new(docs),
		ScriptedEmbedding::new([("network troubleshooting", vec![1., 0.])]),
		ScriptedRelevance::Hang,
	);
	let response = service.search(request("network troubleshooting")).await.unwrap();

	assert_eq!(response.total, 3);

	let no_vec =
		response.results.iter().find(|r| r.original_name == "no-vec.md").unwrap();

	assert_eq!(no_vec.semantic_score, 0.);

	// Hung gateway: every candidate gets the deterministic fallback score and
	// fusion runs with the three-way weights.
	for result in &response.results {
		assert!(result.llm_score.is_some());
		assert!((0. ..=1.).contains(&result.relevance_score));
	}
}

#[tokio::test]
async fn failed_relevance_call_degrades_to_density() {
	let docs = vec![DocumentBuilder::new("doc.md").text("network basics").build()];
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Fail,
	);

	let response = service.search(request("network")).await.unwrap();

	assert!(response.results[0].llm_score.is_some());
}

#[tokio::test]
async fn embeddings_contribute_semantic_score() {
	let docs = vec![
		DocumentBuilder::new("close.md")
			.text("vector search overview")
			.embedding(vec![1., 0.])
			.build(),
		DocumentBuilder::new("far.md")
			.text("vector search history")
			.embedding(vec![0., 1.])
			.build(),
	];
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::new([("vector search", vec![1., 0.])]),
		ScriptedRelevance::Empty,
	);

	let response = service.search(request("vector search")).await.unwrap();
	let close =
		response.results.iter().find(|r| r.original_name == "close.md").unwrap();
	let far = response.results.iter().find(|r| r.original_name == "far.md").unwrap();

	assert_eq!(close.semantic_score, 1.);
	assert_eq!(far.semantic_score, 0.);
}

#[tokio::test]
async fn filters_narrow_candidates() {
	let docs = vec![
		DocumentBuilder::new("finance.pdf")
			.text("quarterly report")
			.folder("finance")
			.mime_type("application/pdf")
			.build(),
		DocumentBuilder::new("hr.pdf")
			.text("quarterly report")
			.folder("hr")
			.mime_type("application/pdf")
			.build(),
	];
	let service = service(
		MemoryStore::new(docs),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);
	let req = SearchRequest {
		folder: Some("finance".to_string()),
		filters: Some(SearchFilters {
			file_types: vec!["application/pdf".to_string()],
			..SearchFilters::default()
		}),
		..request("quarterly report")
	};
	let response = service.search(req).await.unwrap();

	assert_eq!(response.total, 1);
	assert_eq!(response.results[0].original_name, "finance.pdf");
}

#[tokio::test]
async fn workspace_filter_scopes_results() {
	let docs = vec![
		DocumentBuilder::new("bookmarked.pdf").text("quarterly report").build(),
		DocumentBuilder::new("outside.pdf").text("quarterly report").build(),
	];
	let bookmarked_id = docs[0].id;
	let store =
		MemoryStore::new(docs).with_workspace_bookmarks([("finance", vec![bookmarked_id])]);
	let service =
		service(store, ScriptedEmbedding::default(), ScriptedRelevance::Empty);
	let req = SearchRequest {
		filters: Some(SearchFilters {
			workspace: Some("finance".to_string()),
			..SearchFilters::default()
		}),
		..request("quarterly report")
	};
	let response = service.search(req).await.unwrap();

	assert_eq!(response.total, 1);
	assert_eq!(response.results[0].original_name, "bookmarked.pdf");
}

#[tokio::test]
async fn store_failure_propagates() {
	let service = service(
		MemoryStore::failing("connection reset"),
		ScriptedEmbedding::default(),
		ScriptedRelevance::Empty,
	);

	assert!(matches!(
		service.search(request("anything")).await,
		Err(ServiceError::Store { .. })
	));
}
