use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex},
};

use tracing::debug;

use crate::gateway::InferenceGateway;

type CacheKey = [u8; 32];

/// Embedding front-end with a bounded insertion-order cache.
///
/// Failures contacting the inference service yield an empty vector rather
/// than a hashed stand-in, so callers can tell "no semantic signal" apart
/// from a genuine zero-similarity signal.
pub struct EmbeddingClient {
	gateway: Arc<InferenceGateway>,
	cfg: sift_config::Embedding,
	cache: Mutex<FifoCache>,
}

impl EmbeddingClient {
	pub fn new(gateway: Arc<InferenceGateway>, cfg: sift_config::Embedding) -> Self {
		let cache = Mutex::new(FifoCache::new(cfg.cache_size));

		Self { gateway, cfg, cache }
	}

	pub async fn embed(&self, text: &str) -> Vec<f32> {
		let truncated = truncate_chars(text, self.cfg.max_input_chars);
		let key = cache_key(truncated, self.cfg.cache_key_chars);

		{
			let mut cache = self.cache.lock().unwrap_or_else(|err| err.into_inner());

			if let Some(hit) = cache.get(&key) {
				return hit;
			}
		}

		match self.gateway.embed_text(truncated).await {
			Ok(vector) => {
				let mut cache = self.cache.lock().unwrap_or_else(|err| err.into_inner());

				cache.insert(key, vector.clone());

				vector
			},
			Err(err) => {
				debug!(error = %err, "Embedding failed; returning empty vector.");

				Vec::new()
			},
		}
	}
}

/// First-in-first-out cache: overflow evicts the oldest inserted entry, not
/// the least recently used one.
struct FifoCache {
	capacity: usize,
	map: HashMap<CacheKey, Vec<f32>>,
	order: VecDeque<CacheKey>,
}

impl FifoCache {
	fn new(capacity: usize) -> Self {
		Self { capacity: capacity.max(1), map: HashMap::new(), order: VecDeque::new() }
	}

	fn get(&mut self, key: &CacheKey) -> Option<Vec<f32>> {
		self.map.get(key).cloned()
	}

	fn insert(&mut self, key: CacheKey, vector: Vec<f32>) {
		if self.map.contains_key(&key) {
			self.map.insert(key, vector);

			return;
		}

		while self.map.len() >= self.capacity {
			let Some(oldest) = self.order.pop_front() else { break };

			self.map.remove(&oldest);
		}

		self.order.push_back(key);
		self.map.insert(key, vector);
	}

	fn len(&self) -> usize {
		self.map.len()
	}
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}

fn cache_key(text: &str, key_chars: usize) -> CacheKey {
	*blake3::hash(truncate_chars(text, key_chars).as_bytes()).as_bytes()
}
