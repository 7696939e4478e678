//! Scripted providers and document builders shared across crate tests.

use std::{collections::HashMap, time::Duration};

use time::{Duration as TimeDuration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use sift_domain::Document;
use sift_service::{BoxFuture, EmbeddingProvider, RelevanceProvider};

/// Returns the scripted vector for an exact text match, an empty vector
/// otherwise. Mirrors the real provider's "failure means empty" contract.
#[derive(Debug, Default)]
pub struct ScriptedEmbedding {
	vectors: HashMap<String, Vec<f32>>,
}

impl ScriptedEmbedding {
	pub fn new<I>(entries: I) -> Self
	where
		I: IntoIterator<Item = (&'static str, Vec<f32>)>,
	{
		Self {
			vectors: entries.into_iter().map(|(text, vec)| (text.to_string(), vec)).collect(),
		}
	}
}

impl EmbeddingProvider for ScriptedEmbedding {
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>> {
		Box::pin(async move { self.vectors.get(text).cloned().unwrap_or_default() })
	}
}

/// Scripted language-model relevance outcomes.
#[derive(Debug)]
pub enum ScriptedRelevance {
	/// Resolve with the given id-to-score mapping.
	Scores(HashMap<String, u32>),
	/// Resolve with an empty mapping.
	Empty,
	/// Fail with an unavailable-service error.
	Fail,
	/// Sleep past any sane budget, forcing the caller's timeout.
	Hang,
}

impl ScriptedRelevance {
	pub fn scores<I>(entries: I) -> Self
	where
		I: IntoIterator<Item = (Uuid, u32)>,
	{
		Self::Scores(entries.into_iter().map(|(id, score)| (id.to_string(), score)).collect())
	}
}

impl RelevanceProvider for ScriptedRelevance {
	fn relevance_scores<'a>(
		&'a self,
		_: &'a str,
		_: &'a [(String, String)],
	) -> BoxFuture<'a, sift_gateway::Result<HashMap<String, u32>>> {
		Box::pin(async move {
			match self {
				Self::Scores(scores) => Ok(scores.clone()),
				Self::Empty => Ok(HashMap::new()),
				Self::Fail => Err(sift_gateway::Error::Unavailable),
				Self::Hang => {
					tokio::time::sleep(Duration::from_secs(3_600)).await;

					Ok(HashMap::new())
				},
			}
		})
	}
}

/// Builder for test documents with sensible defaults.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
	document: Document,
}

impl DocumentBuilder {
	pub fn new(name: &str) -> Self {
		Self {
			document: Document {
				id: Uuid::new_v4(),
				name: name.to_string(),
				folder: None,
				mime_type: "text/plain".to_string(),
				size: 1_024,
				tags: Vec::new(),
				uploaded_by: "tester".to_string(),
				created_at: datetime!(2025-06-01 00:00 UTC),
				text: String::new(),
				embedding: None,
			},
		}
	}

	pub fn text(mut self, text: &str) -> Self {
		self.document.text = text.to_string();
		self
	}

	pub fn folder(mut self, folder: &str) -> Self {
		self.document.folder = Some(folder.to_string());
		self
	}

	pub fn mime_type(mut self, mime_type: &str) -> Self {
		self.document.mime_type = mime_type.to_string();
		self
	}

	pub fn size(mut self, size: u64) -> Self {
		self.document.size = size;
		self
	}

	pub fn tags<I>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = &'static str>,
	{
		self.document.tags = tags.into_iter().map(str::to_string).collect();
		self
	}

	pub fn uploaded_by(mut self, author: &str) -> Self {
		self.document.uploaded_by = author.to_string();
		self
	}

	/// Days after the builder's base date; higher is more recent.
	pub fn created_days(mut self, days: i64) -> Self {
		self.document.created_at = base_date() + TimeDuration::days(days);
		self
	}

	pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
		self.document.embedding = Some(embedding);
		self
	}

	pub fn build(self) -> Document {
		self.document
	}
}

pub fn base_date() -> OffsetDateTime {
	datetime!(2025-06-01 00:00 UTC)
}
