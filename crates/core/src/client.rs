//! The command surface tying session, poller and sender together.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::command::Command;
use crate::config::ChatboxConfig;
use crate::error::{Error, Result};
use crate::fetcher::{DocumentFetcher, SessionData, SharedSessionData};
use crate::poller::{MessagePoller, PollControl, PollExit};
use crate::sender::{self, MessageSender, SendReport};
use crate::session::SessionState;
use crate::sink::{ChatSink, Notice};
use crate::transport::Transport;

type PollWorker = JoinHandle<(MessagePoller, PollExit)>;

/// A connected chatbox.
///
/// Every command runs on its own task and returns immediately; the returned
/// handles may be awaited or dropped. Cloning yields another handle to the
/// same connection.
#[derive(Clone)]
pub struct ChatboxClient {
	inner: Arc<Inner>,
}

struct Inner {
	session: Arc<SessionState>,
	sender: MessageSender,
	control: Arc<PollControl>,
	sink: Arc<dyn ChatSink>,
	worker: tokio::sync::Mutex<Option<PollWorker>>,
	shared: SharedSessionData,
	forum: Url,
}

impl ChatboxClient {
	/// Logs in, fetches the security token and starts polling.
	pub async fn connect(config: ChatboxConfig, transport: Arc<dyn Transport>, sink: Arc<dyn ChatSink>) -> Result<Self> {
		let shared: SharedSessionData = Arc::new(Mutex::new(SessionData::default()));
		let fetcher = DocumentFetcher::new(transport, config.forum_url.clone(), config.http_timeout, Arc::clone(&shared));
		let control = Arc::new(PollControl::new());

		let session = Arc::new(SessionState::new(
			fetcher.clone(),
			Arc::clone(&shared),
			config.username.clone(),
			config.password.clone(),
			config.token_page,
			Arc::clone(&sink),
		));
		let sender = MessageSender::new(
			Arc::clone(&session),
			fetcher.clone(),
			Arc::clone(&control),
			config.max_network_attempts,
			config.network_retry_delay,
		);

		session.reconnect().await?;

		let poller = MessagePoller::new(
			fetcher,
			Arc::clone(&sink),
			Arc::clone(&control),
			config.username.clone(),
			config.poll_interval,
			config.dedup_window,
		);
		info!(target: "vbchat.client", forum = %config.forum_url, "connected");

		Ok(Self {
			inner: Arc::new(Inner {
				session,
				sender,
				control,
				sink,
				worker: tokio::sync::Mutex::new(Some(spawn_poller(poller))),
				shared,
				forum: config.forum_url,
			}),
		})
	}

	/// Posts `text` in the background. A failure is reported to the sink.
	pub fn send(&self, text: impl Into<String>) -> JoinHandle<Option<SendReport>> {
		let text = text.into();
		let inner = Arc::clone(&self.inner);
		tokio::spawn(async move {
			match inner.sender.send(&text).await {
				Ok(report) => {
					debug!(target: "vbchat.client", ?report, "send finished");
					Some(report)
				}
				Err(err) => {
					warn!(target: "vbchat.client", error = %err, "send failed");
					inner.sink.on_notice(sender::failure_notice(&err));
					None
				}
			}
		})
	}

	/// Logs in again and fetches a new token. Polling resumes if it had
	/// stopped on an authentication challenge.
	pub fn relogin(&self) -> JoinHandle<()> {
		let inner = Arc::clone(&self.inner);
		tokio::spawn(async move {
			match inner.session.reconnect().await {
				Ok(_) => inner.resume_polling().await,
				Err(err) => inner.report_failure("relogin", &err),
			}
		})
	}

	/// Fetches a new security token.
	pub fn retoken(&self) -> JoinHandle<()> {
		let inner = Arc::clone(&self.inner);
		tokio::spawn(async move {
			if let Err(err) = inner.session.refresh_token().await {
				inner.report_failure("retoken", &err);
			}
		})
	}

	/// Polls now instead of waiting for the interval.
	pub fn poke_now(&self) {
		self.inner.control.poke();
	}

	/// Stops polling and waits for the poll task to finish its current
	/// cycle. In-flight sends are left to complete on their own.
	pub async fn stop(&self) {
		self.inner.control.stop();
		let worker = self.inner.worker.lock().await.take();
		if let Some(worker) = worker {
			if let Err(err) = worker.await {
				warn!(target: "vbchat.client", error = %err, "poll task ended abnormally");
			}
		}
		info!(target: "vbchat.client", "stopped");
	}

	pub fn is_stopped(&self) -> bool {
		self.inner.control.is_stopped()
	}

	/// Runs one user command. Returns `false` once the client should quit.
	pub async fn execute(&self, command: Command) -> bool {
		match command {
			Command::Say(text) => {
				self.send(text);
			}
			Command::Relogin => {
				self.relogin();
			}
			Command::Retoken => {
				self.retoken();
			}
			Command::Help => self.inner.sink.on_notice(Notice::Help),
			Command::Unknown(name) => self.inner.sink.on_notice(Notice::UnknownCommand(name)),
			Command::Quit => {
				self.stop().await;
				return false;
			}
		}
		true
	}

	/// Number of cookies held for the session.
	pub fn cookie_count(&self) -> usize {
		self.inner.shared.lock().cookies.count_for(&self.inner.forum)
	}
}

impl Inner {
	async fn resume_polling(&self) {
		let mut worker = self.worker.lock().await;
		if self.control.is_stopped() || !self.control.take_auth_halt() {
			return;
		}
		// the loop has returned or is about to
		let Some(handle) = worker.take() else {
			return;
		};

		match handle.await {
			Ok((poller, PollExit::AuthChallenge { status })) => {
				info!(target: "vbchat.client", status, "resuming polling after relogin");
				*worker = Some(spawn_poller(poller));
			}
			Ok((_, PollExit::Stopped)) => {}
			Err(err) => warn!(target: "vbchat.client", error = %err, "poll task ended abnormally"),
		}
	}

	/// A missing token was already reported by the session.
	fn report_failure(&self, operation: &'static str, err: &Error) {
		warn!(target: "vbchat.client", operation, error = %err, "operation failed");
		if matches!(err, Error::ProtocolViolation(_)) {
			return;
		}
		self.sink.on_notice(Notice::OperationFailed {
			operation,
			reason: err.to_string(),
		});
	}
}

fn spawn_poller(mut poller: MessagePoller) -> PollWorker {
	tokio::spawn(async move {
		let exit = poller.run().await;
		(poller, exit)
	})
}
