use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use sift_service::{SearchRequest, SearchResponse, ServiceError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	inference: &'static str,
}

/// Always 200; a down inference service degrades search instead of
/// failing it, so it is reported rather than propagated.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	let inference = if state.gateway.health().await { "reachable" } else { "unreachable" };

	Json(HealthResponse { status: "ok", inference })
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	retryable: bool,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	retryable: bool,
}

impl ApiError {
	fn new(status: StatusCode, error_code: &str, message: String, retryable: bool) -> Self {
		Self { status, error_code: error_code.to_string(), message, retryable }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "validation", message, false),
			ServiceError::Store { message } => classify_store(message),
		}
	}
}

/// The store surfaces untyped backend failures; the message decides whether
/// the client should retry.
fn classify_store(message: String) -> ApiError {
	let lowered = message.to_lowercase();

	if lowered.contains("timeout") || lowered.contains("timed out") {
		ApiError::new(StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", message, true)
	} else if ["unavailable", "network", "connection", "refused"]
		.iter()
		.any(|needle| lowered.contains(needle))
	{
		ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", message, true)
	} else {
		ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message, false)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			retryable: self.retryable,
		};

		(self.status, Json(body)).into_response()
	}
}
