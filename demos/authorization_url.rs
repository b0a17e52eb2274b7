//! Prints the Polar authorization URL for a client, the way `GET /auth/login` builds it.
//!
//! Usage: `cargo run --example authorization_url -- <client-id> [state]`

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use polar_oauth_bridge::{
	config::{BridgeConfig, ClientCredentials},
	flows::ReqwestBridge,
	provider::ProviderDescriptor,
	store::{MemoryStore, TokenStore},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let mut args = env::args().skip(1);
	let client_id = args.next().ok_or_else(|| eyre!("missing <client-id> argument"))?;
	let state = args.next();
	let config = BridgeConfig::new(
		ClientCredentials::new(client_id, "unused-for-this-demo"),
		Url::parse("http://localhost:3000/auth/callback")?,
		ProviderDescriptor::polar()?,
	);
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let bridge = ReqwestBridge::new(config, store)?;

	println!("{}", bridge.begin_authorization(state.as_deref()));

	Ok(())
}
