pub mod breaker;
pub mod client;
pub mod embedding;
pub mod error;
pub mod gateway;
pub mod parse;

pub use breaker::{CircuitBreaker, CircuitState};
pub use client::{BoxFuture, ModelClient, OllamaClient};
pub use embedding::EmbeddingClient;
pub use error::{Error, Result};
pub use gateway::InferenceGateway;
