use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
	time::{Duration, Instant},
};

use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
	breaker::CircuitBreaker,
	client::{ModelClient, OllamaClient},
	error::{Error, Result},
	parse,
};

/// Resilient front to the inference service: circuit breaker, bounded
/// retries with jittered backoff, and model bootstrapping.
///
/// One gateway is shared process-wide; the breaker and the installed-model
/// cache are the only mutable state and live for the process lifetime.
pub struct InferenceGateway {
	cfg: sift_config::Gateway,
	client: Arc<dyn ModelClient>,
	breaker: Mutex<CircuitBreaker>,
	models: Mutex<ModelCache>,
	pulled_default: Mutex<bool>,
}

#[derive(Debug, Default)]
struct ModelCache {
	names: Vec<String>,
	fetched_at: Option<Instant>,
}

impl InferenceGateway {
	pub fn new(cfg: sift_config::Gateway) -> Result<Self> {
		let client = OllamaClient::new(&cfg.api_base)?;

		Ok(Self::with_client(cfg, Arc::new(client)))
	}

	/// Same gateway over an injected transport.
	pub fn with_client(cfg: sift_config::Gateway, client: Arc<dyn ModelClient>) -> Self {
		let breaker = CircuitBreaker::new(
			cfg.breaker.failure_threshold,
			Duration::from_millis(cfg.breaker.reset_timeout_ms),
		);

		Self {
			cfg,
			client,
			breaker: Mutex::new(breaker),
			models: Mutex::new(ModelCache::default()),
			pulled_default: Mutex::new(false),
		}
	}

	pub async fn health(&self) -> bool {
		self.client.health(Duration::from_millis(self.cfg.timeouts.health_ms)).await
	}

	/// One logical generation call: breaker guard and retry loop around
	/// single attempts. Transient failures back off and retry; terminal
	/// failures propagate immediately.
	pub async fn generate(&self, prompt: &str) -> Result<String> {
		let model = self.resolve_model().await?;

		self.generate_with_model(&model, prompt).await
	}

	/// Asks the model for a JSON object mapping candidate id to an integer
	/// 0-100. Unparseable output yields an empty map, never an error, so the
	/// ranking pipeline can fall back deterministically.
	pub async fn generate_relevance_scores(
		&self,
		query: &str,
		excerpts: &[(String, String)],
	) -> Result<HashMap<String, u32>> {
		if excerpts.is_empty() {
			return Ok(HashMap::new());
		}

		let prompt = build_relevance_prompt(query, excerpts);
		let raw = self.generate(&prompt).await?;
		let Some(object) = parse::extract_json_object(&raw) else {
			debug!(raw_len = raw.len(), "Relevance response had no JSON object.");

			return Ok(HashMap::new());
		};
		let mut scores = HashMap::new();

		for (id, value) in object {
			let Some(score) = score_value(&value) else { continue };

			scores.insert(id, score);
		}

		Ok(scores)
	}

	/// Single-attempt embedding call. Callers treat failures as "no semantic
	/// signal", so this carries no retry loop of its own.
	pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
		let timeout = Duration::from_millis(self.cfg.timeouts.generate_ms);

		self.client.embed(&self.cfg.embedding_model, text, timeout).await
	}

	/// Picks the generation model, bootstrapping the service if needed:
	/// an empty install list triggers the prioritized fallback installs, a
	/// missing configured model gets one pull attempt before substitution.
	pub async fn resolve_model(&self) -> Result<String> {
		let installed = self.installed_models(false).await?;

		if installed.is_empty() {
			return self.bootstrap_fallback_models().await;
		}

		if let Some(matched) = match_installed(&installed, &self.cfg.default_model) {
			return Ok(matched);
		}

		let should_pull = {
			let mut pulled = self.pulled_default.lock().unwrap_or_else(|err| err.into_inner());
			let first = !*pulled;

			*pulled = true;

			first
		};

		if should_pull {
			let timeout = Duration::from_millis(self.cfg.timeouts.pull_ms);

			match self.client.pull_model(&self.cfg.default_model, timeout).await {
				Ok(()) => {
					self.installed_models(true).await.ok();

					return Ok(self.cfg.default_model.clone());
				},
				Err(err) => {
					warn!(model = %self.cfg.default_model, error = %err, "Configured model pull failed; substituting an installed model.");
				},
			}
		}

		installed
			.first()
			.cloned()
			.ok_or_else(|| Error::ModelNotFound { model: self.cfg.default_model.clone() })
	}

	async fn bootstrap_fallback_models(&self) -> Result<String> {
		let timeout = Duration::from_millis(self.cfg.timeouts.pull_ms);

		for model in &self.cfg.fallback_models {
			match self.client.pull_model(model, timeout).await {
				Ok(()) => {
					self.installed_models(true).await.ok();

					return Ok(model.clone());
				},
				Err(err) => {
					warn!(model = %model, error = %err, "Fallback model install failed.");
				},
			}
		}

		Err(Error::ModelNotFound { model: self.cfg.default_model.clone() })
	}

	async fn installed_models(&self, force: bool) -> Result<Vec<String>> {
		let ttl = Duration::from_millis(self.cfg.models_ttl_ms);

		if !force {
			let cache = self.models.lock().unwrap_or_else(|err| err.into_inner());

			if let Some(fetched_at) = cache.fetched_at
				&& fetched_at.elapsed() < ttl
			{
				return Ok(cache.names.clone());
			}
		}

		let timeout = Duration::from_millis(self.cfg.timeouts.health_ms);
		let names = self.client.list_models(timeout).await?;
		let mut cache = self.models.lock().unwrap_or_else(|err| err.into_inner());

		cache.names = names.clone();
		cache.fetched_at = Some(Instant::now());

		Ok(names)
	}

	async fn generate_with_model(&self, model: &str, prompt: &str) -> Result<String> {
		let attempts = self.cfg.retry.max_retries.max(1);
		let mut last_err = None;

		for attempt in 0..attempts {
			if attempt > 0 {
				tokio::time::sleep(self.backoff_delay(attempt)).await;
			}

			if !self.breaker_allows() {
				return Err(Error::Unavailable);
			}

			match self.attempt_generate(model, prompt).await {
				Ok(text) => {
					self.breaker.lock().unwrap_or_else(|err| err.into_inner()).record_success();

					return Ok(text);
				},
				Err(err) => {
					self.breaker
						.lock()
						.unwrap_or_else(|err| err.into_inner())
						.record_failure(Instant::now());

					if !err.is_retryable() {
						return Err(err);
					}

					warn!(attempt, error = %err, "Generation attempt failed.");

					last_err = Some(err);
				},
			}
		}

		Err(last_err.unwrap_or(Error::Unavailable))
	}

	/// A 404 mid-call gets one pull-and-retry, then one substitution with an
	/// alternate installed model. A second 404 propagates instead of
	/// recursing, so the auto-install path runs at most once per call.
	async fn attempt_generate(&self, model: &str, prompt: &str) -> Result<String> {
		let timeout = Duration::from_millis(self.cfg.timeouts.generate_ms);

		match self.client.generate(model, prompt, timeout).await {
			Err(Error::ModelNotFound { .. }) => self.recover_missing_model(model, prompt).await,
			other => other,
		}
	}

	async fn recover_missing_model(&self, model: &str, prompt: &str) -> Result<String> {
		let pull_timeout = Duration::from_millis(self.cfg.timeouts.pull_ms);
		let load_timeout = Duration::from_millis(self.cfg.timeouts.model_load_ms);

		match self.client.pull_model(model, pull_timeout).await {
			Ok(()) => {
				self.installed_models(true).await.ok();

				match self.client.generate(model, prompt, load_timeout).await {
					Ok(text) => return Ok(text),
					Err(err) => {
						warn!(model = %model, error = %err, "Generation still failing after pull.");
					},
				}
			},
			Err(err) => {
				warn!(model = %model, error = %err, "Automatic model pull failed.");
			},
		}

		let installed = self.installed_models(true).await?;
		let Some(alternate) = installed.iter().find(|name| name.as_str() != model) else {
			return Err(Error::ModelNotFound { model: model.to_string() });
		};

		debug!(from = %model, to = %alternate, "Substituting alternate installed model.");

		self.client.generate(alternate, prompt, load_timeout).await
	}

	fn breaker_allows(&self) -> bool {
		self.breaker.lock().unwrap_or_else(|err| err.into_inner()).check(Instant::now())
	}

	/// Exponential backoff with equal jitter, capped at `max_delay_ms`.
	fn backoff_delay(&self, attempt: u32) -> Duration {
		let base = self.cfg.retry.base_delay_ms.max(1);
		let exp = base.saturating_mul(1_u64 << attempt.saturating_sub(1).min(16));
		let capped = exp.min(self.cfg.retry.max_delay_ms);
		let half = capped / 2;
		let jitter = if half == 0 { 0 } else { rand::rng().random_range(0..=half) };

		Duration::from_millis(half + jitter)
	}
}

fn match_installed(installed: &[String], wanted: &str) -> Option<String> {
	installed
		.iter()
		.find(|name| name.as_str() == wanted || name.starts_with(&format!("{wanted}:")))
		.cloned()
}

fn build_relevance_prompt(query: &str, excerpts: &[(String, String)]) -> String {
	let mut prompt = String::with_capacity(256 + excerpts.len() * 128);

	prompt.push_str("You score how relevant documents are to a search query.\n");
	prompt.push_str(&format!("Query: {query:?}\n\nDocuments:\n"));

	for (id, excerpt) in excerpts {
		prompt.push_str(&format!("[{id}] {excerpt}\n"));
	}

	prompt.push_str(
		"\nRespond with only a JSON object mapping each document id to an integer \
		 relevance score from 0 to 100. Example: {\"doc-1\": 85, \"doc-2\": 10}\n",
	);

	prompt
}

fn score_value(value: &Value) -> Option<u32> {
	match value {
		Value::Number(number) => number.as_f64().map(|v| v.round().clamp(0.0, 100.0) as u32),
		Value::String(text) => text.trim().parse::<f64>().ok().map(|v| v.round().clamp(0.0, 100.0) as u32),
		_ => None,
	}
}
