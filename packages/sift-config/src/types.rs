use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub gateway: Gateway,
	pub embedding: Embedding,
	pub search: Search,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: "127.0.0.1:8090".to_string(), log_level: "info".to_string() }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Gateway {
	/// Base URL of the Ollama-compatible inference service.
	pub api_base: String,
	/// Preferred generation model. Pulled once if absent.
	pub default_model: String,
	/// Lightweight models installed in order when the service has none.
	pub fallback_models: Vec<String>,
	pub embedding_model: String,
	pub timeouts: GatewayTimeouts,
	pub retry: GatewayRetry,
	pub breaker: GatewayBreaker,
	/// How long the installed-model list stays fresh before re-probing.
	pub models_ttl_ms: u64,
}
impl Default for Gateway {
	fn default() -> Self {
		Self {
			api_base: "http://127.0.0.1:11434".to_string(),
			default_model: "llama3.2:3b".to_string(),
			fallback_models: vec![
				"llama3.2:1b".to_string(),
				"qwen2.5:0.5b".to_string(),
				"tinyllama".to_string(),
			],
			embedding_model: "nomic-embed-text".to_string(),
			timeouts: GatewayTimeouts::default(),
			retry: GatewayRetry::default(),
			breaker: GatewayBreaker::default(),
			models_ttl_ms: 60_000,
		}
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GatewayTimeouts {
	pub health_ms: u64,
	pub generate_ms: u64,
	/// First generation after an install; covers cold model load.
	pub model_load_ms: u64,
	pub pull_ms: u64,
}
impl Default for GatewayTimeouts {
	fn default() -> Self {
		Self { health_ms: 2_000, generate_ms: 30_000, model_load_ms: 120_000, pull_ms: 600_000 }
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GatewayRetry {
	pub max_retries: u32,
	pub base_delay_ms: u64,
	pub max_delay_ms: u64,
}
impl Default for GatewayRetry {
	fn default() -> Self {
		Self { max_retries: 3, base_delay_ms: 500, max_delay_ms: 8_000 }
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GatewayBreaker {
	pub failure_threshold: u32,
	pub reset_timeout_ms: u64,
}
impl Default for GatewayBreaker {
	fn default() -> Self {
		Self { failure_threshold: 5, reset_timeout_ms: 30_000 }
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Embedding {
	/// Bounded FIFO cache; overflow evicts the oldest entry.
	pub cache_size: usize,
	/// Input is truncated to this many characters before submission.
	pub max_input_chars: usize,
	/// Cache keys hash this many leading characters of the input.
	pub cache_key_chars: usize,
}
impl Default for Embedding {
	fn default() -> Self {
		Self { cache_size: 512, max_input_chars: 2_000, cache_key_chars: 256 }
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Search {
	pub paging: SearchPaging,
	pub rerank: SearchRerank,
	pub fusion: SearchFusion,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SearchPaging {
	pub default_limit: u32,
	pub max_limit: u32,
}
impl Default for SearchPaging {
	fn default() -> Self {
		Self { default_limit: 10, max_limit: 50 }
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SearchRerank {
	/// Upper bound on candidates sent to the language model.
	pub batch_size: usize,
	/// Wall-clock budget for the re-rank call; must stay below the gateway
	/// generation timeout so the race, not the gateway, decides.
	pub budget_ms: u64,
	/// Excerpt length used both in the prompt and the density fallback.
	pub excerpt_chars: usize,
}
impl Default for SearchRerank {
	fn default() -> Self {
		Self { batch_size: 8, budget_ms: 10_000, excerpt_chars: 500 }
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SearchFusion {
	pub lexical_weight: f32,
	pub semantic_weight: f32,
	pub llm_weight: f32,
	/// Weights used when no language-model score exists for a candidate.
	pub lexical_only_weight: f32,
	pub semantic_only_weight: f32,
}
impl Default for SearchFusion {
	fn default() -> Self {
		Self {
			lexical_weight: 0.4,
			semantic_weight: 0.3,
			llm_weight: 0.3,
			lexical_only_weight: 0.6,
			semantic_only_weight: 0.4,
		}
	}
}
