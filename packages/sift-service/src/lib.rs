pub mod search;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use regex::Regex;

use sift_domain::{Document, DocumentFilter};
use sift_gateway::{EmbeddingClient, InferenceGateway};
pub use search::{SearchFilters, SearchRequest, SearchResponse, SearchResult};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Store error: {message}")]
	Store { message: String },
}

/// Failure surfaced by the external document store. The ranking pipeline has
/// no fallback for a failed primary retrieval, so these always propagate.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<StoreError> for ServiceError {
	fn from(err: StoreError) -> Self {
		Self::Store { message: err.0 }
	}
}

/// A document plus the native relevance score the full-text backend may have
/// attached. When present, the native score is preferred over the computed
/// term-frequency sum.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
	pub document: Document,
	pub native_score: Option<f32>,
}

/// The external document store, queryable by free text and by an OR-regex
/// fallback. Ranked retrieval first; the regex path orders by recency.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn search_text<'a>(
		&'a self,
		query: &'a str,
		filter: &'a DocumentFilter,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredDocument>, StoreError>>;

	fn search_regex<'a>(
		&'a self,
		pattern: &'a Regex,
		filter: &'a DocumentFilter,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<Document>, StoreError>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	/// Empty vector means "no semantic signal"; never an error.
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>>;
}

pub trait RelevanceProvider
where
	Self: Send + Sync,
{
	fn relevance_scores<'a>(
		&'a self,
		query: &'a str,
		excerpts: &'a [(String, String)],
	) -> BoxFuture<'a, sift_gateway::Result<HashMap<String, u32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub relevance: Arc<dyn RelevanceProvider>,
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, relevance: Arc<dyn RelevanceProvider>) -> Self {
		Self { embedding, relevance }
	}

	/// Default wiring over the real inference gateway.
	pub fn for_gateway(gateway: Arc<InferenceGateway>, embedding: sift_config::Embedding) -> Self {
		let client = EmbeddingClient::new(gateway.clone(), embedding);

		Self::new(Arc::new(DefaultEmbedding { client }), Arc::new(DefaultRelevance { gateway }))
	}
}

pub struct SiftService {
	pub cfg: sift_config::Config,
	pub store: Arc<dyn DocumentStore>,
	pub providers: Providers,
}

struct DefaultEmbedding {
	client: EmbeddingClient,
}

struct DefaultRelevance {
	gateway: Arc<InferenceGateway>,
}

impl EmbeddingProvider for DefaultEmbedding {
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>> {
		Box::pin(self.client.embed(text))
	}
}

impl RelevanceProvider for DefaultRelevance {
	fn relevance_scores<'a>(
		&'a self,
		query: &'a str,
		excerpts: &'a [(String, String)],
	) -> BoxFuture<'a, sift_gateway::Result<HashMap<String, u32>>> {
		Box::pin(self.gateway.generate_relevance_scores(query, excerpts))
	}
}

impl SiftService {
	/// Wires the real inference gateway behind the provider seams. The store
	/// stays injected; it belongs to the hosting application.
	pub fn new(
		cfg: sift_config::Config,
		store: Arc<dyn DocumentStore>,
	) -> sift_gateway::Result<Self> {
		let gateway = Arc::new(InferenceGateway::new(cfg.gateway.clone())?);
		let providers = Providers::for_gateway(gateway, cfg.embedding);

		Ok(Self { cfg, store, providers })
	}

	pub fn with_providers(
		cfg: sift_config::Config,
		store: Arc<dyn DocumentStore>,
		providers: Providers,
	) -> Self {
		Self { cfg, store, providers }
	}
}
