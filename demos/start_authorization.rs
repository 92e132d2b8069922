//! Walks through a full OAuth 1.0a handshake from a terminal: obtain a request token, visit
//! the authorize page, paste the verifier back, and print the resulting access token.
//!
//! Reads `SMUGMUG_CONSUMER_KEY`, `SMUGMUG_CONSUMER_SECRET`, and `CALLBACK_URL` from the
//! environment or a `.env` file.

// std
use std::io::{self, BufRead, Write};
// crates.io
use color_eyre::Result;
// self
use oauth1_broker::{
	config::BrokerConfig,
	flows::{Broker, CallbackParams, TokenExchange},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();

	let config = BrokerConfig::from_env()?;
	let broker = Broker::from_config(&config)?;
	let mut exchange = TokenExchange::new(&broker);
	let session = exchange.start().await?;

	println!("Send your user to {}.", session.authorize_url);
	print!("Paste the oauth_verifier shown after approval: ");
	io::stdout().flush()?;

	let mut verifier = String::new();

	io::stdin().lock().read_line(&mut verifier)?;
	exchange.authorize(CallbackParams::new(
		session.request_token.key(),
		verifier.trim(),
		session.carried_secret.clone(),
	))?;

	let access = exchange.finish().await?;

	println!("Access token: {}.", access.key());

	let user = broker.api().user_info(&access).await?;

	println!("Authorized as {}.", user.nickname);

	Ok(())
}
