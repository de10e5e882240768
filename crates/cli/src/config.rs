//! Config file loading and the merge of command-line flags over it.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vbchat::{ChatboxConfig, TokenPage};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Settings as read from the JSON config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
	#[serde(default)]
	pub forum_url: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
	#[serde(default)]
	pub poll_interval_secs: Option<u64>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub token_page: Option<String>,
}

impl FileConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&content).map_err(|source| CliError::ParseConfig {
			path: path.to_path_buf(),
			source,
		})
	}
}

/// Builds the client configuration from the flags, falling back to the
/// config file named by `--config` for anything not given.
pub fn resolve(cli: &Cli) -> Result<ChatboxConfig> {
	let file = match &cli.config {
		Some(path) => FileConfig::load(path)?,
		None => FileConfig::default(),
	};
	merge(cli, file)
}

pub fn merge(cli: &Cli, file: FileConfig) -> Result<ChatboxConfig> {
	let forum = required(cli.forum.clone().or(file.forum_url), "forum URL", "--forum", "forumUrl")?;
	let username = required(cli.username.clone().or(file.username), "username", "--username", "username")?;
	let password = required(
		cli.password.clone().or(file.password),
		"password",
		"--password or VBCHAT_PASSWORD",
		"password",
	)?;

	let mut config = ChatboxConfig::new(&forum, username, password)?;
	if let Some(secs) = cli.poll_interval_secs.or(file.poll_interval_secs) {
		config = config.with_poll_interval(Duration::from_secs(secs));
	}
	if let Some(secs) = cli.timeout_secs.or(file.timeout_secs) {
		config = config.with_http_timeout(Duration::from_secs(secs));
	}
	let token_page = match (cli.token_page, file.token_page) {
		(Some(page), _) => Some(page),
		(None, Some(name)) => Some(name.parse::<TokenPage>().map_err(CliError::InvalidTokenPage)?),
		(None, None) => None,
	};
	if let Some(page) = token_page {
		config = config.with_token_page(page);
	}
	Ok(config)
}

fn required(value: Option<String>, what: &'static str, flag: &'static str, key: &'static str) -> Result<String> {
	value
		.filter(|v| !v.is_empty())
		.ok_or(CliError::MissingSetting { what, flag, key })
}
