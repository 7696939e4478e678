use std::{future::Future, pin::Pin, time::Duration};

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::time;

use crate::error::{Error, Result};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Call surface of the inference service. The gateway's breaker, retry, and
/// bootstrap logic runs against this seam, so tests can script the transport.
pub trait ModelClient
where
	Self: Send + Sync,
{
	fn health<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, bool>;

	fn list_models<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, Result<Vec<String>>>;

	fn pull_model<'a>(&'a self, name: &'a str, timeout: Duration) -> BoxFuture<'a, Result<()>>;

	fn generate<'a>(
		&'a self,
		model: &'a str,
		prompt: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<String>>;

	fn embed<'a>(
		&'a self,
		model: &'a str,
		text: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

/// Thin HTTP client for the Ollama-compatible inference API.
///
/// Carries no retry or breaker logic; every call is a single attempt wrapped
/// in the timeout class the caller picked.
#[derive(Debug, Clone)]
pub struct OllamaClient {
	http: Client,
	api_base: String,
}

impl OllamaClient {
	pub fn new(api_base: &str) -> Result<Self> {
		let http = Client::builder().build()?;

		Ok(Self { http, api_base: api_base.trim_end_matches('/').to_string() })
	}

	pub async fn health(&self, timeout: Duration) -> bool {
		let request = self.http.get(&self.api_base).send();

		matches!(time::timeout(timeout, request).await, Ok(Ok(res)) if res.status().is_success())
	}

	pub async fn list_models(&self, timeout: Duration) -> Result<Vec<String>> {
		let url = format!("{}/api/tags", self.api_base);
		let response = time::timeout(timeout, self.http.get(&url).send())
			.await
			.map_err(|_| Error::Timeout(timeout))??;
		let json: Value = check_status(response, None).await?.json().await?;
		let models = json.get("models").and_then(Value::as_array).ok_or_else(|| {
			Error::InvalidResponse { message: "Model list is missing models array.".to_string() }
		})?;

		Ok(models
			.iter()
			.filter_map(|model| model.get("name").and_then(Value::as_str))
			.map(str::to_string)
			.collect())
	}

	/// Pulls a model, draining the streamed status events until the service
	/// reports success. Not cancellable once the stream begins, short of
	/// dropping the future at the timeout boundary.
	pub async fn pull_model(&self, name: &str, timeout: Duration) -> Result<()> {
		let url = format!("{}/api/pull", self.api_base);
		let body = serde_json::json!({ "name": name });

		time::timeout(timeout, self.drain_pull(&url, name, body))
			.await
			.map_err(|_| Error::Timeout(timeout))?
	}

	async fn drain_pull(&self, url: &str, name: &str, body: Value) -> Result<()> {
		let response = self.http.post(url).json(&body).send().await?;
		let mut response = check_status(response, Some(name)).await?;
		let mut saw_success = false;
		let mut buffer = Vec::new();

		while let Some(chunk) = response.chunk().await? {
			buffer.extend_from_slice(&chunk);

			while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
				let line: Vec<u8> = buffer.drain(..=newline).collect();
				let Ok(event) = serde_json::from_slice::<Value>(&line) else { continue };

				if let Some(error) = event.get("error").and_then(Value::as_str) {
					return Err(Error::InvalidResponse {
						message: format!("Model pull failed: {error}"),
					});
				}
				if event.get("status").and_then(Value::as_str) == Some("success") {
					saw_success = true;
				}
			}
		}

		if !buffer.is_empty()
			&& let Ok(event) = serde_json::from_slice::<Value>(&buffer)
			&& event.get("status").and_then(Value::as_str) == Some("success")
		{
			saw_success = true;
		}

		if saw_success {
			Ok(())
		} else {
			Err(Error::InvalidResponse {
				message: format!("Model pull for {name:?} ended without success status."),
			})
		}
	}

	pub async fn generate(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String> {
		let url = format!("{}/api/generate", self.api_base);
		let body = serde_json::json!({ "model": model, "prompt": prompt, "stream": false });
		let request = self.http.post(&url).json(&body).send();
		let response = time::timeout(timeout, request).await.map_err(|_| Error::Timeout(timeout))??;
		let json: Value = check_status(response, Some(model)).await?.json().await.map_err(|_| {
			Error::InvalidResponse { message: "Generation response is not JSON.".to_string() }
		})?;

		json.get("response").and_then(Value::as_str).map(str::to_string).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Generation response is missing response text.".to_string(),
			}
		})
	}

	pub async fn embed(&self, model: &str, text: &str, timeout: Duration) -> Result<Vec<f32>> {
		let url = format!("{}/api/embeddings", self.api_base);
		let body = serde_json::json!({ "model": model, "prompt": text });
		let request = self.http.post(&url).json(&body).send();
		let response = time::timeout(timeout, request).await.map_err(|_| Error::Timeout(timeout))??;
		let json: Value = check_status(response, Some(model)).await?.json().await.map_err(|_| {
			Error::InvalidResponse { message: "Embedding response is not JSON.".to_string() }
		})?;
		let values = json.get("embedding").and_then(Value::as_array).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding response is missing embedding array.".to_string(),
			}
		})?;

		values
			.iter()
			.map(|value| {
				value.as_f64().map(|v| v as f32).ok_or_else(|| Error::InvalidResponse {
					message: "Embedding value must be numeric.".to_string(),
				})
			})
			.collect()
	}
}

impl ModelClient for OllamaClient {
	fn health<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, bool> {
		Box::pin(OllamaClient::health(self, timeout))
	}

	fn list_models<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(OllamaClient::list_models(self, timeout))
	}

	fn pull_model<'a>(&'a self, name: &'a str, timeout: Duration) -> BoxFuture<'a, Result<()>> {
		Box::pin(OllamaClient::pull_model(self, name, timeout))
	}

	fn generate<'a>(
		&'a self,
		model: &'a str,
		prompt: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(OllamaClient::generate(self, model, prompt, timeout))
	}

	fn embed<'a>(
		&'a self,
		model: &'a str,
		text: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(OllamaClient::embed(self, model, text, timeout))
	}
}

async fn check_status(response: Response, model: Option<&str>) -> Result<Response> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let message = response.text().await.unwrap_or_default();

	Err(match status {
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
		StatusCode::NOT_FOUND => Error::ModelNotFound {
			model: model.unwrap_or("<unspecified>").to_string(),
		},
		StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY =>
			Error::InvalidRequest { message },
		_ => Error::InvalidResponse {
			message: format!("Unexpected status {status}: {message}"),
		},
	})
}
