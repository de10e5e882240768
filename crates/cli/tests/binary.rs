//! Running the `vbchat` binary.

use std::process::Command;

use tempfile::TempDir;

fn vbchat() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_vbchat"));
	cmd.env_remove("VBCHAT_PASSWORD").env_remove("RUST_LOG").env("NO_COLOR", "1");
	cmd
}

#[test]
fn missing_forum_fails_with_a_hint() {
	let output = vbchat().args(["--username", "alice", "--password", "pw"]).output().unwrap();

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("missing forum URL"), "stderr: {stderr}");
}

#[test]
fn unreadable_config_file_fails() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("missing.json");

	let output = vbchat().arg("--config").arg(&path).output().unwrap();

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("failed to read config file"), "stderr: {stderr}");
}

#[test]
fn help_lists_the_flags() {
	let output = vbchat().arg("--help").output().unwrap();

	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	for flag in ["--forum", "--username", "--password", "--config", "--poll-interval-secs", "--token-page"] {
		assert!(stdout.contains(flag), "missing {flag} in help");
	}
}
