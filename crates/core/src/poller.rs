//! The message feed polling loop.
//!
//! Each cycle fetches the feed, keeps the rows not delivered yet, and hands
//! them to the sink oldest first. Between cycles the loop sleeps for the
//! poll interval; [`PollControl::poke`] cuts the sleep short and
//! [`PollControl::stop`] ends the loop.
//!
//! Failures are handled per cycle: a timeout or a transport error just
//! leads to the next cycle, an authentication challenge is reported to the
//! sink once and ends the loop until an operator logs in again.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};
use vbchat_protocol::{ChatRow, Endpoint, KnownUser, RemoteMessage, parse_feed, timestamp};

use crate::error::{Error, Result};
use crate::fetcher::{DocumentFetcher, Fetch};
use crate::sink::ChatSink;

/// High-water mark of delivered message ids.
///
/// The forum's id counter is not documented to be monotonic, so an id at
/// least `window` below the mark is treated as new again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCursor {
	last_seen: u64,
	window: u64,
}

impl PollCursor {
	pub fn new(window: u64) -> Self {
		Self { last_seen: 0, window }
	}

	pub fn last_seen(&self) -> u64 {
		self.last_seen
	}

	/// Seen means `last_seen >= id` with a distance below the window.
	pub fn is_new(&self, id: u64) -> bool {
		!(self.last_seen >= id && self.last_seen - id < self.window)
	}

	/// Moves the mark up to `id`. The mark never moves down.
	pub fn advance(&mut self, id: u64) {
		self.last_seen = self.last_seen.max(id);
	}
}

/// Wake-up and shutdown signals for a running poller.
#[derive(Debug, Default)]
pub struct PollControl {
	wake: Notify,
	stopped: AtomicBool,
	auth_halted: AtomicBool,
}

impl PollControl {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start the next cycle now. A poke during a cycle skips the next sleep.
	pub fn poke(&self) {
		self.wake.notify_one();
	}

	/// Ends the loop before its next cycle. An in-flight fetch is not cancelled.
	pub fn stop(&self) {
		self.stopped.store(true, Ordering::SeqCst);
		self.wake.notify_one();
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::SeqCst)
	}

	/// Clears and returns the mark left by a loop that ended on an
	/// authentication challenge. The mark is set before the sink hears of it.
	pub fn take_auth_halt(&self) -> bool {
		self.auth_halted.swap(false, Ordering::SeqCst)
	}
}

/// Why [`MessagePoller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
	Stopped,
	/// The forum answered the feed with 401 or 403.
	AuthChallenge { status: u16 },
}

pub struct MessagePoller {
	fetcher: DocumentFetcher,
	sink: Arc<dyn ChatSink>,
	control: Arc<PollControl>,
	cursor: PollCursor,
	users: HashMap<u64, KnownUser>,
	own_username: String,
	interval: Duration,
}

impl MessagePoller {
	pub fn new(
		fetcher: DocumentFetcher,
		sink: Arc<dyn ChatSink>,
		control: Arc<PollControl>,
		own_username: impl Into<String>,
		interval: Duration,
		dedup_window: u64,
	) -> Self {
		Self {
			fetcher,
			sink,
			control,
			cursor: PollCursor::new(dedup_window),
			users: HashMap::new(),
			own_username: own_username.into(),
			interval,
		}
	}

	pub fn cursor(&self) -> PollCursor {
		self.cursor
	}

	pub fn known_user(&self, user_id: u64) -> Option<&KnownUser> {
		self.users.get(&user_id)
	}

	/// Polls until stopped or refused by the forum.
	///
	/// The cursor and known users are kept, so calling `run` again resumes
	/// where the previous run left off.
	pub async fn run(&mut self) -> PollExit {
		info!(target: "vbchat.poll", interval_ms = self.interval.as_millis() as u64, "poller started");

		loop {
			if self.control.is_stopped() {
				info!(target: "vbchat.poll", "poller stopped");
				return PollExit::Stopped;
			}

			match self.poll_once().await {
				Ok(delivered) => trace!(target: "vbchat.poll", delivered, "poll cycle complete"),
				Err(Error::Timeout) => debug!(target: "vbchat.poll", "poll timed out"),
				Err(Error::AuthChallenge { status, body }) => {
					warn!(target: "vbchat.poll", status, "feed refused; polling stops until relogin");
					self.control.auth_halted.store(true, Ordering::SeqCst);
					self.sink.on_error(status, &body);
					return PollExit::AuthChallenge { status };
				}
				Err(err) => debug!(target: "vbchat.poll", error = %err, "poll failed; retrying next cycle"),
			}

			self.sleep().await;
		}
	}

	/// Runs a single cycle and returns how many messages were delivered.
	pub async fn poll_once(&mut self) -> Result<usize> {
		let page = self.fetcher.fetch_checked(Fetch::get(Endpoint::Messages)).await?;
		let rows = parse_feed(&page.body);
		let fresh = self.collect_new(rows);

		let delivered = fresh.len();
		for message in fresh {
			self.sink.on_message(message);
		}
		Ok(delivered)
	}

	/// Filters the rows of one cycle and returns the new messages oldest
	/// first. Users seen for the first time are announced on the way.
	fn collect_new(&mut self, rows: Vec<ChatRow>) -> Vec<RemoteMessage> {
		let now = Utc::now();
		let mut newest = self.cursor.last_seen();
		let mut fresh = Vec::new();

		for row in rows {
			let Some((id, user_id)) = row.ids() else {
				trace!(target: "vbchat.poll", "skipping row without message or member link");
				continue;
			};
			if !self.cursor.is_new(id) {
				continue;
			}
			newest = newest.max(id);

			if !self.users.contains_key(&user_id) {
				let user = KnownUser::new(user_id, row.nickname.clone(), &self.own_username);
				debug!(target: "vbchat.poll", user_id, nickname = %user.nickname, "new user");
				self.users.insert(user_id, user.clone());
				self.sink.on_user_appeared(user);
			}

			fresh.push(RemoteMessage {
				id,
				user_id,
				from_self: row.nickname == self.own_username,
				timestamp: timestamp::row_timestamp(&row.meta_html, now),
				nickname: row.nickname,
				body_html: row.body_html,
			});
		}

		fresh.reverse();
		self.cursor.advance(newest);
		fresh
	}

	async fn sleep(&self) {
		tokio::select! {
			_ = tokio::time::sleep(self.interval) => {}
			_ = self.control.wake.notified() => {
				trace!(target: "vbchat.poll", "sleep interrupted");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_within_the_window_below_the_mark_are_seen() {
		let mut cursor = PollCursor::new(3000);
		cursor.advance(5000);

		assert!(!cursor.is_new(5000));
		assert!(!cursor.is_new(2001));
		assert!(cursor.is_new(2000));
		assert!(cursor.is_new(5001));
	}

	#[test]
	fn fresh_cursor_treats_everything_above_zero_as_new() {
		let cursor = PollCursor::new(3000);
		assert!(!cursor.is_new(0));
		assert!(cursor.is_new(1));
	}

	#[test]
	fn cursor_never_moves_down() {
		let mut cursor = PollCursor::new(3000);
		cursor.advance(10);
		cursor.advance(4);
		assert_eq!(cursor.last_seen(), 10);
	}

	#[tokio::test]
	async fn poke_before_sleep_is_remembered() {
		let control = PollControl::new();
		control.poke();
		tokio::time::timeout(Duration::from_secs(1), control.wake.notified())
			.await
			.expect("stored poke should complete the wait");
	}
}
