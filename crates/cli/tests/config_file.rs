//! Loading the JSON config file and merging flags over it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tempfile::TempDir;
use vbchat::TokenPage;
use vbchat_cli::cli::Cli;
use vbchat_cli::config::{self, FileConfig};
use vbchat_cli::error::CliError;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
	let path = dir.path().join("vbchat.json");
	std::fs::write(&path, content).unwrap();
	path
}

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("vbchat").chain(args.iter().copied())).unwrap()
}

#[test]
fn file_supplies_every_setting() {
	let dir = TempDir::new().unwrap();
	let path = write_config(
		&dir,
		r#"{
			"forumUrl": "https://forum.example.com/board?styleid=2",
			"username": "alice",
			"password": "secret",
			"pollIntervalSecs": 10,
			"timeoutSecs": 2,
			"tokenPage": "chatbox"
		}"#,
	);

	let config = config::resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();

	assert_eq!(config.forum_url.as_str(), "https://forum.example.com/board/");
	assert_eq!(config.username, "alice");
	assert_eq!(config.poll_interval, Duration::from_secs(10));
	assert_eq!(config.http_timeout, Duration::from_secs(2));
	assert_eq!(config.token_page, TokenPage::Chatbox);
}

#[test]
fn flags_override_the_file() {
	let dir = TempDir::new().unwrap();
	let path = write_config(
		&dir,
		r#"{"forumUrl": "https://old.example.com/", "username": "alice", "password": "a", "pollIntervalSecs": 10}"#,
	);

	let config = config::resolve(&parse(&[
		"--config",
		path.to_str().unwrap(),
		"--forum",
		"https://new.example.com/",
		"--username",
		"bob",
		"--password",
		"b",
		"--poll-interval-secs",
		"3",
	]))
	.unwrap();

	assert_eq!(config.forum_url.as_str(), "https://new.example.com/");
	assert_eq!(config.username, "bob");
	assert_eq!(config.password, "b");
	assert_eq!(config.poll_interval, Duration::from_secs(3));
	assert_eq!(config.token_page, TokenPage::Faq);
}

#[test]
fn partial_file_leaves_defaults_alone() {
	let dir = TempDir::new().unwrap();
	let path = write_config(&dir, r#"{"username": "alice", "theme": "dark"}"#);

	let file = FileConfig::load(&path).unwrap();

	assert_eq!(
		file,
		FileConfig {
			username: Some("alice".into()),
			..FileConfig::default()
		}
	);
}

#[test]
fn unreadable_and_malformed_files_are_reported() {
	let dir = TempDir::new().unwrap();

	let missing = FileConfig::load(&dir.path().join("absent.json")).unwrap_err();
	assert!(matches!(missing, CliError::ReadConfig { .. }));

	let path = write_config(&dir, "{ not json");
	let malformed = FileConfig::load(&path).unwrap_err();
	assert!(matches!(malformed, CliError::ParseConfig { .. }));
	assert!(malformed.to_string().starts_with("invalid config file"));
}
