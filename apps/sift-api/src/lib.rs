pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sift_store_memory::MemoryStore;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON corpus loaded into the in-memory store at startup.
	#[arg(long, value_name = "FILE")]
	pub corpus: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config)?;

	init_tracing(&config)?;

	let store = match &args.corpus {
		Some(path) => {
			let store = MemoryStore::load_json(path)?;

			tracing::info!(documents = store.len(), corpus = %path.display(), "Corpus loaded.");

			store
		},
		None => {
			tracing::warn!("No corpus given; serving an empty store.");

			MemoryStore::default()
		},
	};
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config, Arc::new(store))?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

fn init_tracing(config: &sift_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	Ok(())
}
