use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::error;
use vbchat::{ChatboxClient, ReqwestTransport};
use vbchat_cli::cli::Cli;
use vbchat_cli::sink::TerminalSink;
use vbchat_cli::{config, logging, repl};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = run(cli).await {
		let message = format!("{err:#}");
		error!(target: "vbchat", error = %message, "vbchat failed");
		std::process::exit(1);
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let config = config::resolve(&cli)?;
	let forum = config.forum_url.clone();
	let transport = Arc::new(ReqwestTransport::new()?);

	let client = ChatboxClient::connect(config, transport, Arc::new(TerminalSink::new()))
		.await
		.with_context(|| format!("could not connect to {forum}"))?;

	repl::run(&client, BufReader::new(tokio::io::stdin())).await?;
	Ok(())
}
