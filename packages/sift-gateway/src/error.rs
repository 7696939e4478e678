use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The circuit breaker is open; no network attempt was made.
	#[error("Inference service temporarily unavailable.")]
	Unavailable,
	#[error("Inference request timed out after {0:?}.")]
	Timeout(Duration),
	#[error(transparent)]
	Network(#[from] reqwest::Error),
	#[error("Model {model:?} is not installed and could not be pulled.")]
	ModelNotFound { model: String },
	#[error("Invalid response from the inference service: {message}")]
	InvalidResponse { message: String },
	#[error("Inference service rejected the request as unauthorized.")]
	Unauthorized,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}

impl Error {
	/// Only transient network conditions and timeouts are worth retrying;
	/// everything else propagates immediately.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Timeout(_) | Self::Network(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timeouts_are_retryable() {
		assert!(Error::Timeout(Duration::from_secs(1)).is_retryable());
	}

	#[test]
	fn terminal_errors_are_not_retryable() {
		assert!(!Error::Unavailable.is_retryable());
		assert!(!Error::ModelNotFound { model: "m".to_string() }.is_retryable());
		assert!(!Error::InvalidResponse { message: "bad json".to_string() }.is_retryable());
		assert!(!Error::Unauthorized.is_retryable());
		assert!(!Error::InvalidRequest { message: "empty prompt".to_string() }.is_retryable());
	}
}
