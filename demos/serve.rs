//! Runs the broker gateway on `BIND_ADDR` (default `127.0.0.1:3000`).
//!
//! Configuration comes from the environment or a `.env` file; set `RUST_LOG` to adjust
//! verbosity.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use oauth1_broker::{config::BrokerConfig, flows::Broker, gateway::Gateway, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let config = BrokerConfig::from_env()?;
	let broker = Broker::from_config(&config)?;
	let gateway = Gateway::new(broker).with_client_redirect(config.client_redirect.clone());
	let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
	let listener = TcpListener::bind(&addr).await?;

	server::serve(listener, server::router(Arc::new(gateway))).await?;

	Ok(())
}
