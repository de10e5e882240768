use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};
use vbchat::{ChatboxClient, Command};

use crate::error::Result;

/// Feeds input lines to the client until `/quit`, end of input or Ctrl+C.
/// The client is stopped on every exit path.
pub async fn run<R>(client: &ChatboxClient, input: R) -> Result<()>
where
	R: AsyncBufRead + Unpin,
{
	let mut lines = input.lines();
	loop {
		let line = tokio::select! {
			line = lines.next_line() => line,
			_ = tokio::signal::ctrl_c() => {
				info!(target: "vbchat.cli", "interrupted");
				Ok(None)
			}
		};
		let line = match line {
			Ok(Some(line)) => line,
			Ok(None) => {
				debug!(target: "vbchat.cli", "end of input");
				client.stop().await;
				return Ok(());
			}
			Err(err) => {
				client.stop().await;
				return Err(err.into());
			}
		};
		let Some(command) = Command::parse(&line) else {
			continue;
		};
		if !client.execute(command).await {
			return Ok(());
		}
	}
}
