mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Embedding, Gateway, GatewayBreaker, GatewayRetry, GatewayTimeouts, Search,
	SearchFusion, SearchPaging, SearchRerank, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.gateway.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "gateway.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.gateway.default_model.trim().is_empty() {
		return Err(Error::Validation {
			message: "gateway.default_model must be non-empty.".to_string(),
		});
	}
	if cfg.gateway.embedding_model.trim().is_empty() {
		return Err(Error::Validation {
			message: "gateway.embedding_model must be non-empty.".to_string(),
		});
	}
	if cfg.gateway.timeouts.health_ms == 0 || cfg.gateway.timeouts.generate_ms == 0 {
		return Err(Error::Validation {
			message: "gateway.timeouts must be greater than zero.".to_string(),
		});
	}
	if cfg.gateway.timeouts.health_ms >= cfg.gateway.timeouts.generate_ms {
		return Err(Error::Validation {
			message: "gateway.timeouts.health_ms must be less than generate_ms.".to_string(),
		});
	}
	if cfg.gateway.retry.base_delay_ms == 0 {
		return Err(Error::Validation {
			message: "gateway.retry.base_delay_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.gateway.retry.max_delay_ms < cfg.gateway.retry.base_delay_ms {
		return Err(Error::Validation {
			message: "gateway.retry.max_delay_ms must be at least base_delay_ms.".to_string(),
		});
	}
	if cfg.gateway.breaker.failure_threshold == 0 {
		return Err(Error::Validation {
			message: "gateway.breaker.failure_threshold must be greater than zero.".to_string(),
		});
	}
	if cfg.gateway.breaker.reset_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "gateway.breaker.reset_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.embedding.cache_size == 0 {
		return Err(Error::Validation {
			message: "embedding.cache_size must be greater than zero.".to_string(),
		});
	}
	if cfg.embedding.max_input_chars == 0 || cfg.embedding.cache_key_chars == 0 {
		return Err(Error::Validation {
			message: "embedding character limits must be greater than zero.".to_string(),
		});
	}
	if cfg.search.paging.default_limit == 0
		|| cfg.search.paging.max_limit == 0
		|| cfg.search.paging.default_limit > cfg.search.paging.max_limit
	{
		return Err(Error::Validation {
			message: "search.paging limits must be positive and default_limit <= max_limit."
				.to_string(),
		});
	}
	if cfg.search.rerank.batch_size == 0 {
		return Err(Error::Validation {
			message: "search.rerank.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.rerank.budget_ms == 0
		|| cfg.search.rerank.budget_ms >= cfg.gateway.timeouts.generate_ms
	{
		return Err(Error::Validation {
			message:
				"search.rerank.budget_ms must be positive and below gateway.timeouts.generate_ms."
					.to_string(),
		});
	}
	if cfg.search.rerank.excerpt_chars == 0 {
		return Err(Error::Validation {
			message: "search.rerank.excerpt_chars must be greater than zero.".to_string(),
		});
	}

	let fusion = &cfg.search.fusion;

	for (label, weight) in [
		("lexical_weight", fusion.lexical_weight),
		("semantic_weight", fusion.semantic_weight),
		("llm_weight", fusion.llm_weight),
		("lexical_only_weight", fusion.lexical_only_weight),
		("semantic_only_weight", fusion.semantic_only_weight),
	] {
		if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("search.fusion.{label} must be in the range 0.0-1.0."),
			});
		}
	}

	let full_sum = fusion.lexical_weight + fusion.semantic_weight + fusion.llm_weight;

	if (full_sum - 1.0).abs() > 1e-4 {
		return Err(Error::Validation {
			message: "search.fusion lexical+semantic+llm weights must sum to 1.0.".to_string(),
		});
	}

	let partial_sum = fusion.lexical_only_weight + fusion.semantic_only_weight;

	if (partial_sum - 1.0).abs() > 1e-4 {
		return Err(Error::Validation {
			message: "search.fusion lexical_only+semantic_only weights must sum to 1.0."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.gateway.api_base = cfg.gateway.api_base.trim().trim_end_matches('/').to_string();
	cfg.gateway.default_model = cfg.gateway.default_model.trim().to_string();
	cfg.gateway.embedding_model = cfg.gateway.embedding_model.trim().to_string();
	cfg.gateway.fallback_models = cfg
		.gateway
		.fallback_models
		.iter()
		.map(|model| model.trim().to_string())
		.filter(|model| !model.is_empty())
		.collect();
}
