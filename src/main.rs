//! Polar AccessLink OAuth 2.0 bridge server.

// std
use std::sync::Arc;
// crates.io
use clap::Parser;
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use polar_oauth_bridge::{
	config::Settings,
	flows::ReqwestBridge,
	http::ReqwestHttpClient,
	server,
	store::{RedisStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let settings = Settings::parse();

	tracing::debug!(?settings, "settings loaded");

	let config = settings.bridge_config()?;
	let http_client = ReqwestHttpClient::new(Some(settings.http_timeout()))?;
	let store: Arc<dyn TokenStore> = Arc::new(RedisStore::connect(&settings.store_url).await?);
	let bridge = ReqwestBridge::with_http_client(config, store, http_client);
	let listener = TcpListener::bind(settings.bind).await?;

	tracing::info!(addr = %listener.local_addr()?, "server running");

	server::serve(listener, bridge, shutdown_signal()).await?;

	tracing::info!("server stopped");

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for the shutdown signal");
	}
}
