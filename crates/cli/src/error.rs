use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("failed to read config file {path}: {source}")]
	ReadConfig {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config file {path}: {source}")]
	ParseConfig {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("missing {what}: pass {flag} or set \"{key}\" in the config file")]
	MissingSetting {
		what: &'static str,
		flag: &'static str,
		key: &'static str,
	},

	#[error("invalid \"tokenPage\" in config file: {0}")]
	InvalidTokenPage(String),

	#[error("failed to read input: {0}")]
	Input(#[from] std::io::Error),

	#[error(transparent)]
	Client(#[from] vbchat::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
