use std::path::PathBuf;

use clap::Parser;
use vbchat::TokenPage;

#[derive(Parser, Debug)]
#[command(name = "vbchat")]
#[command(about = "Chat in a vBulletin chatbox from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON config file; flags override its values
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Forum base URL, e.g. https://forum.example.com/
	#[arg(short, long, value_name = "URL")]
	pub forum: Option<String>,

	#[arg(short, long, value_name = "NAME")]
	pub username: Option<String>,

	#[arg(long, env = "VBCHAT_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Seconds between feed polls
	#[arg(long, value_name = "SECS")]
	pub poll_interval_secs: Option<u64>,

	/// Per-request timeout in seconds
	#[arg(long, value_name = "SECS")]
	pub timeout_secs: Option<u64>,

	/// Page the security token is read from (faq or chatbox)
	#[arg(long, value_name = "PAGE")]
	pub token_page: Option<TokenPage>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_every_flag() {
		let cli = Cli::try_parse_from([
			"vbchat",
			"-vv",
			"--forum",
			"https://forum.example.com/",
			"--username",
			"alice",
			"--password",
			"pw",
			"--poll-interval-secs",
			"10",
			"--timeout-secs",
			"3",
			"--token-page",
			"chatbox",
		])
		.unwrap();

		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.forum.as_deref(), Some("https://forum.example.com/"));
		assert_eq!(cli.username.as_deref(), Some("alice"));
		assert_eq!(cli.password.as_deref(), Some("pw"));
		assert_eq!(cli.poll_interval_secs, Some(10));
		assert_eq!(cli.timeout_secs, Some(3));
		assert_eq!(cli.token_page, Some(TokenPage::Chatbox));
	}

	#[test]
	fn rejects_unknown_token_page() {
		assert!(Cli::try_parse_from(["vbchat", "--token-page", "index"]).is_err());
	}
}
