use std::sync::Arc;

use sift_gateway::InferenceGateway;
use sift_service::{DocumentStore, Providers, SiftService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
	pub gateway: Arc<InferenceGateway>,
}
impl AppState {
	pub fn new(
		config: sift_config::Config,
		store: Arc<dyn DocumentStore>,
	) -> color_eyre::Result<Self> {
		let gateway = Arc::new(InferenceGateway::new(config.gateway.clone())?);
		let providers = Providers::for_gateway(gateway.clone(), config.embedding);
		let service = SiftService::with_providers(config, store, providers);

		Ok(Self { service: Arc::new(service), gateway })
	}

	/// Same shape with the provider seams replaced, for tests.
	pub fn with_providers(
		config: sift_config::Config,
		store: Arc<dyn DocumentStore>,
		providers: Providers,
	) -> color_eyre::Result<Self> {
		let gateway = Arc::new(InferenceGateway::new(config.gateway.clone())?);
		let service = SiftService::with_providers(config, store, providers);

		Ok(Self { service: Arc::new(service), gateway })
	}
}
