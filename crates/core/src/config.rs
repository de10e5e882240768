use std::fmt;
use std::time::Duration;

use url::Url;
use vbchat_protocol::TokenPage;

use crate::error::Result;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_NETWORK_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_DEDUP_WINDOW: u64 = 3000;
pub const DEFAULT_MAX_NETWORK_ATTEMPTS: u32 = 5;

/// Settings for one chatbox connection.
#[derive(Clone)]
pub struct ChatboxConfig {
	/// Forum root, always ending in `/`.
	pub forum_url: Url,
	pub username: String,
	pub password: String,
	pub poll_interval: Duration,
	pub http_timeout: Duration,
	/// Pause between network-level retries of a post.
	pub network_retry_delay: Duration,
	/// How far below the watermark a message id still counts as seen.
	pub dedup_window: u64,
	pub max_network_attempts: u32,
	pub token_page: TokenPage,
}

impl ChatboxConfig {
	/// Creates a configuration with default timings.
	///
	/// `forum_url` is the forum root; query and fragment are dropped and a
	/// trailing slash is added so endpoint paths resolve below it.
	pub fn new(forum_url: &str, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		Ok(Self {
			forum_url: normalize_forum_url(forum_url)?,
			username: username.into(),
			password: password.into(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			http_timeout: DEFAULT_HTTP_TIMEOUT,
			network_retry_delay: DEFAULT_NETWORK_RETRY_DELAY,
			dedup_window: DEFAULT_DEDUP_WINDOW,
			max_network_attempts: DEFAULT_MAX_NETWORK_ATTEMPTS,
			token_page: TokenPage::default(),
		})
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
		self.http_timeout = timeout;
		self
	}

	pub fn with_network_retry_delay(mut self, delay: Duration) -> Self {
		self.network_retry_delay = delay;
		self
	}

	pub fn with_dedup_window(mut self, window: u64) -> Self {
		self.dedup_window = window;
		self
	}

	/// At least one attempt is always made.
	pub fn with_max_network_attempts(mut self, attempts: u32) -> Self {
		self.max_network_attempts = attempts.max(1);
		self
	}

	pub fn with_token_page(mut self, page: TokenPage) -> Self {
		self.token_page = page;
		self
	}
}

impl fmt::Debug for ChatboxConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChatboxConfig")
			.field("forum_url", &self.forum_url.as_str())
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("poll_interval", &self.poll_interval)
			.field("http_timeout", &self.http_timeout)
			.field("network_retry_delay", &self.network_retry_delay)
			.field("dedup_window", &self.dedup_window)
			.field("max_network_attempts", &self.max_network_attempts)
			.field("token_page", &self.token_page)
			.finish()
	}
}

fn normalize_forum_url(raw: &str) -> Result<Url> {
	let mut url = Url::parse(raw.trim())?;
	url.set_query(None);
	url.set_fragment(None);
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	Ok(url)
}
