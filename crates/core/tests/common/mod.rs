//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;
use vbchat::fake::{FakeTransport, RecordingSink};
use vbchat::fetcher::{DocumentFetcher, SessionData, SharedSessionData};
use vbchat::{ChatboxConfig, MessagePoller, MessageSender, PollControl, SessionState, TokenPage};

pub const FORUM: &str = "http://forum.test/";
pub const USERNAME: &str = "alice";

pub fn init_tracing() {
	static ONCE: OnceLock<()> = OnceLock::new();
	ONCE.get_or_init(|| {
		tracing_subscriber::fmt()
			.with_env_filter(
				tracing_subscriber::EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
			)
			.with_test_writer()
			.init();
	});
}

/// A forum page carrying `token` the way `faq.php` does.
pub fn token_page(token: &str) -> String {
	format!(
		r#"<html><body><form action="faq.php" method="post">
<input type="hidden" name="s" value="" />
<input type="hidden" name="securitytoken" value="{token}" />
</form></body></html>"#
	)
}

/// One feed row as the chatbox renders it.
pub fn feed_row(id: u64, user_id: u64, nickname: &str, body: &str) -> String {
	format!(
		r#"<tr>
<td class="alt2" nowrap="nowrap">[18-03-24, 21:07] <a href="misc.php?ccbloc={id}" target="_blank">#</a> <a href="member.php?u={user_id}" target="_blank">{nickname}</a></td>
<td class="alt1" width="100%"> {body} </td>
</tr>
"#
	)
}

/// A feed with the given `(id, user_id, nickname)` rows, in the order given.
pub fn feed(rows: &[(u64, u64, &str)]) -> String {
	rows.iter()
		.map(|&(id, user, nick)| feed_row(id, user, nick, &format!("message {id}")))
		.collect()
}

/// The pieces a client is built from, wired to a fake forum.
pub struct Harness {
	pub transport: Arc<FakeTransport>,
	pub sink: Arc<RecordingSink>,
	pub shared: SharedSessionData,
	pub fetcher: DocumentFetcher,
	pub session: Arc<SessionState>,
	pub control: Arc<PollControl>,
}

impl Harness {
	pub fn new(transport: FakeTransport) -> Self {
		Self::with_token_page(transport, TokenPage::Faq)
	}

	pub fn with_token_page(transport: FakeTransport, token_page: TokenPage) -> Self {
		init_tracing();
		let transport = Arc::new(transport);
		let sink = Arc::new(RecordingSink::new());
		let shared: SharedSessionData = Arc::new(Mutex::new(SessionData::default()));
		let fetcher = DocumentFetcher::new(
			transport.clone(),
			Url::parse(FORUM).unwrap(),
			Duration::from_secs(1),
			Arc::clone(&shared),
		);
		let session = Arc::new(SessionState::new(
			fetcher.clone(),
			Arc::clone(&shared),
			USERNAME,
			"secret",
			token_page,
			sink.clone(),
		));
		Self {
			transport,
			sink,
			shared,
			fetcher,
			session,
			control: Arc::new(PollControl::new()),
		}
	}

	pub fn sender(&self, max_network_attempts: u32) -> MessageSender {
		MessageSender::new(
			Arc::clone(&self.session),
			self.fetcher.clone(),
			Arc::clone(&self.control),
			max_network_attempts,
			Duration::from_millis(1),
		)
	}

	pub fn poller(&self, interval: Duration) -> MessagePoller {
		MessagePoller::new(
			self.fetcher.clone(),
			self.sink.clone(),
			Arc::clone(&self.control),
			USERNAME,
			interval,
			3000,
		)
	}
}

/// Client configuration for the fake forum with fast timings.
pub fn fast_config() -> ChatboxConfig {
	ChatboxConfig::new(FORUM, USERNAME, "secret")
		.unwrap()
		.with_poll_interval(Duration::from_secs(60))
		.with_network_retry_delay(Duration::from_millis(1))
}
