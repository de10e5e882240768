//! Posting messages with escalating recovery.
//!
//! A post is accepted when the forum answers 200 with an empty body. Any
//! other answer is a rejection and escalates: first the token is refreshed,
//! then the session is logged in again, then the send gives up. Network
//! failures are retried separately with the same request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, info, warn};
use vbchat_protocol::{Endpoint, form};

use crate::error::{Error, Result};
use crate::fetcher::{DocumentFetcher, Fetch, Page};
use crate::poller::PollControl;
use crate::session::SessionState;
use crate::sink::Notice;

/// Recovery step after the post of attempt `n` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
	RefreshToken,
	/// Log in again, then refresh the token.
	Relogin,
	GiveUp,
}

impl Escalation {
	pub fn after_rejection(attempt: u32) -> Self {
		match attempt {
			0 => Self::RefreshToken,
			1 => Self::Relogin,
			_ => Self::GiveUp,
		}
	}
}

/// What a successful send took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendReport {
	/// Posts that reached the forum and got an answer.
	pub attempts: u32,
	/// Token refreshes on their own. A relogin refreshes the token as well
	/// and is only counted in `relogins`.
	pub token_refreshes: u32,
	pub relogins: u32,
}

#[derive(Clone)]
pub struct MessageSender {
	session: Arc<SessionState>,
	fetcher: DocumentFetcher,
	control: Arc<PollControl>,
	max_network_attempts: u32,
	network_retry_delay: Duration,
}

impl MessageSender {
	pub fn new(
		session: Arc<SessionState>,
		fetcher: DocumentFetcher,
		control: Arc<PollControl>,
		max_network_attempts: u32,
		network_retry_delay: Duration,
	) -> Self {
		Self {
			session,
			fetcher,
			control,
			max_network_attempts: max_network_attempts.max(1),
			network_retry_delay,
		}
	}

	/// Posts `text`, escalating on rejection, and pokes the poller once the
	/// forum accepts it.
	///
	/// Fails with [`Error::SendRejected`] once the ladder is exhausted, with a
	/// network error once the network retries are, with [`Error::Stopped`] if
	/// the client stops while retrying, or with the error of a failed recovery
	/// step.
	pub async fn send(&self, text: &str) -> Result<SendReport> {
		let mut report = SendReport::default();
		let mut attempt = 0;

		loop {
			let token = match self.session.current_token() {
				Some(token) => token,
				None => self.session.refresh_token().await?,
			};

			let page = self.post(&token, text).await?;
			report.attempts += 1;
			if page.status == 200 && page.body.is_empty() {
				info!(target: "vbchat.send", attempts = report.attempts, "message posted");
				self.control.poke();
				return Ok(report);
			}

			let escalation = Escalation::after_rejection(attempt);
			debug!(target: "vbchat.send", attempt, status = page.status, ?escalation, "post rejected");
			match escalation {
				Escalation::RefreshToken => {
					self.session.refresh_token().await?;
					report.token_refreshes += 1;
				}
				Escalation::Relogin => {
					self.session.reconnect().await?;
					report.relogins += 1;
				}
				Escalation::GiveUp => {
					warn!(target: "vbchat.send", status = page.status, "giving up on message");
					return Err(Error::SendRejected {
						status: page.status,
						body: page.body,
					});
				}
			}
			attempt += 1;
		}
	}

	/// One post, retried on network failures only. Retries end once the
	/// client is stopped.
	async fn post(&self, token: &str, text: &str) -> Result<Page> {
		let body = form::post_body(token, text);
		let mut tries = 0;

		loop {
			tries += 1;
			match self.fetcher.fetch(Fetch::post(Endpoint::Post, body.clone()).non_persistent()).await {
				Ok(page) => return Ok(page),
				Err(err) if err.is_network() && tries < self.max_network_attempts => {
					warn!(target: "vbchat.send", tries, error = %err, "post failed; retrying");
					tokio::time::sleep(self.network_retry_delay).await;
					if self.control.is_stopped() {
						return Err(Error::Stopped);
					}
				}
				Err(err) => return Err(err),
			}
		}
	}
}

/// The status line reporting a failed send.
pub fn failure_notice(err: &Error) -> Notice {
	match err {
		Error::SendRejected { status, .. } => Notice::SendFailed {
			status: Some(*status),
			reason: StatusCode::from_u16(*status)
				.ok()
				.and_then(|code| code.canonical_reason())
				.unwrap_or("Unknown")
				.to_string(),
		},
		other => Notice::SendFailed {
			status: None,
			reason: other.to_string(),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ladder_refreshes_then_relogs_then_gives_up() {
		assert_eq!(Escalation::after_rejection(0), Escalation::RefreshToken);
		assert_eq!(Escalation::after_rejection(1), Escalation::Relogin);
		assert_eq!(Escalation::after_rejection(2), Escalation::GiveUp);
		assert_eq!(Escalation::after_rejection(7), Escalation::GiveUp);
	}

	#[test]
	fn rejection_notice_names_the_status() {
		let notice = failure_notice(&Error::SendRejected {
			status: 500,
			body: String::new(),
		});
		assert_eq!(notice.to_string(), "Failed to send message; HTTP error code: [500] Internal Server Error");

		let network = failure_notice(&Error::Timeout);
		assert_eq!(network.to_string(), "Failed to send message: request timed out");
	}
}
