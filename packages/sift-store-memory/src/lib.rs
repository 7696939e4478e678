//! In-memory [`DocumentStore`] used by the local server and the test suites.

use std::{
	collections::{HashMap, HashSet},
	fs,
	path::Path,
};

use regex::Regex;
use uuid::Uuid;

use sift_domain::{Document, DocumentFilter};
use sift_service::{BoxFuture, DocumentStore, ScoredDocument, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("failed to read corpus file, {0}")]
	ReadCorpus(std::io::Error),
	#[error("failed to parse corpus file, {0}")]
	ParseCorpus(serde_json::Error),
}

/// Holds the whole corpus in memory. Full-text search is a case-insensitive
/// phrase match over name and content; the regex path additionally scans tags
/// and orders by recency.
#[derive(Debug, Default)]
pub struct MemoryStore {
	docs: Vec<Document>,
	native_scores: HashMap<Uuid, f32>,
	/// Workspace name to the ids bookmarked into it. A workspace-scoped
	/// search only sees bookmarked documents; an unknown workspace sees none.
	bookmarks: HashMap<String, HashSet<Uuid>>,
	failure: Option<String>,
}

impl MemoryStore {
	pub fn new(docs: Vec<Document>) -> Self {
		Self { docs, ..Self::default() }
	}

	/// Loads a JSON array of documents, as produced by the indexing side.
	pub fn load_json<P>(path: P) -> Result<Self, LoadError>
	where
		P: AsRef<Path>,
	{
		let raw = fs::read_to_string(path).map_err(LoadError::ReadCorpus)?;
		let docs = serde_json::from_str(&raw).map_err(LoadError::ParseCorpus)?;

		Ok(Self::new(docs))
	}

	/// Attaches backend-native relevance scores to specific documents.
	pub fn with_native_scores<I>(mut self, scores: I) -> Self
	where
		I: IntoIterator<Item = (Uuid, f32)>,
	{
		self.native_scores = scores.into_iter().collect();
		self
	}

	/// Registers workspace bookmark sets consulted by workspace-scoped
	/// searches.
	pub fn with_workspace_bookmarks<I>(mut self, bookmarks: I) -> Self
	where
		I: IntoIterator<Item = (&'static str, Vec<Uuid>)>,
	{
		self.bookmarks = bookmarks
			.into_iter()
			.map(|(workspace, ids)| (workspace.to_string(), ids.into_iter().collect()))
			.collect();
		self
	}

	/// Makes every search fail with the given message.
	pub fn failing(message: &str) -> Self {
		Self { failure: Some(message.to_string()), ..Self::default() }
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	fn check_failure(&self) -> Result<(), StoreError> {
		match &self.failure {
			Some(message) => Err(StoreError(message.clone())),
			None => Ok(()),
		}
	}

	fn in_workspace(&self, filter: &DocumentFilter, doc: &Document) -> bool {
		match filter.workspace.as_deref() {
			Some(workspace) =>
				self.bookmarks.get(workspace).is_some_and(|ids| ids.contains(&doc.id)),
			None => true,
		}
	}
}

impl DocumentStore for MemoryStore {
	fn search_text<'a>(
		&'a self,
		query: &'a str,
		filter: &'a DocumentFilter,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredDocument>, StoreError>> {
		Box::pin(async move {
			self.check_failure()?;

			let phrase = query.trim().to_lowercase();
			let mut matched = self
				.docs
				.iter()
				.filter(|doc| self.in_workspace(filter, doc) && filter.matches(doc))
				.filter(|doc| {
					doc.text.to_lowercase().contains(&phrase)
						|| doc.name.to_lowercase().contains(&phrase)
				})
				.map(|doc| ScoredDocument {
					document: doc.clone(),
					native_score: self.native_scores.get(&doc.id).copied(),
				})
				.collect::<Vec<_>>();

			matched.sort_by(|a, b| {
				let by_score = b
					.native_score
					.unwrap_or(0.)
					.partial_cmp(&a.native_score.unwrap_or(0.))
					.unwrap_or(std::cmp::Ordering::Equal);

				by_score.then_with(|| b.document.created_at.cmp(&a.document.created_at))
			});
			matched.truncate(limit);

			Ok(matched)
		})
	}

	fn search_regex<'a>(
		&'a self,
		pattern: &'a Regex,
		filter: &'a DocumentFilter,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<Document>, StoreError>> {
		Box::pin(async move {
			self.check_failure()?;

			let mut matched = self
				.docs
				.iter()
				.filter(|doc| self.in_workspace(filter, doc) && filter.matches(doc))
				.filter(|doc| {
					pattern.is_match(&doc.text)
						|| pattern.is_match(&doc.name)
						|| doc.tags.iter().any(|tag| pattern.is_match(tag))
				})
				.cloned()
				.collect::<Vec<_>>();

			matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
			matched.truncate(limit);

			Ok(matched)
		})
	}
}
