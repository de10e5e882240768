//! In-memory stand-ins for the forum and the chat layer.
//!
//! [`FakeTransport`] answers requests from per-endpoint scripts and records
//! everything it receives; [`RecordingSink`] records every event and lets a
//! test wait for one.
//!
//! ```ignore
//! let transport = Arc::new(
//!     FakeTransport::new()
//!         .respond(Endpoint::FaqPage, FakeReply::ok(r#"<input name="securitytoken" value="t1">"#))
//!         .script(Endpoint::Post, [FakeReply::status(200, "error"), FakeReply::ok("")]),
//! );
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use vbchat_protocol::{Endpoint, KnownUser, RemoteMessage, latin1};

use crate::sink::{ChatSink, Notice};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport, TransportFailure, TransportFuture};

/// A scripted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeReply {
	Respond {
		status: u16,
		body: String,
		set_cookies: Vec<String>,
	},
	Timeout,
	NetworkError(String),
}

impl FakeReply {
	/// 200 with `body`.
	pub fn ok(body: impl Into<String>) -> Self {
		Self::status(200, body)
	}

	pub fn status(status: u16, body: impl Into<String>) -> Self {
		Self::Respond {
			status,
			body: body.into(),
			set_cookies: Vec::new(),
		}
	}

	pub fn network_error() -> Self {
		Self::NetworkError("connection refused".to_string())
	}

	/// Adds a `Set-Cookie` header. No effect on failures.
	pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
		if let Self::Respond { set_cookies, .. } = &mut self {
			set_cookies.push(cookie.into());
		}
		self
	}
}

/// A request as the fake received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
	pub method: Method,
	/// Last path segment plus query, comparable to [`Endpoint::path`].
	pub target: String,
	pub body: Option<String>,
	pub cookie_header: Option<String>,
	pub keep_alive: bool,
}

#[derive(Debug, Default)]
struct Route {
	queued: VecDeque<FakeReply>,
	repeat: Option<FakeReply>,
}

/// Scripted [`Transport`]. Unscripted endpoints answer 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
	routes: Mutex<HashMap<&'static str, Route>>,
	requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers every request to `endpoint` with `reply` once queued replies
	/// are used up.
	pub fn respond(self, endpoint: Endpoint, reply: FakeReply) -> Self {
		self.routes.lock().entry(endpoint.path()).or_default().repeat = Some(reply);
		self
	}

	/// Queues one-shot replies for `endpoint`, used in order.
	pub fn script(self, endpoint: Endpoint, replies: impl IntoIterator<Item = FakeReply>) -> Self {
		self.routes.lock().entry(endpoint.path()).or_default().queued.extend(replies);
		self
	}

	/// Replaces the repeating reply of a live transport.
	pub fn set_reply(&self, endpoint: Endpoint, reply: FakeReply) {
		self.routes.lock().entry(endpoint.path()).or_default().repeat = Some(reply);
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	/// Number of requests made to `endpoint` so far.
	pub fn count(&self, endpoint: Endpoint) -> usize {
		self.requests.lock().iter().filter(|r| r.target == endpoint.path()).count()
	}

	fn next_reply(&self, target: &str) -> FakeReply {
		let mut routes = self.routes.lock();
		let Some(route) = routes.get_mut(target) else {
			return FakeReply::status(404, "");
		};
		route
			.queued
			.pop_front()
			.or_else(|| route.repeat.clone())
			.unwrap_or_else(|| FakeReply::status(404, ""))
	}
}

impl Transport for FakeTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let segment = request.url.path().rsplit('/').next().unwrap_or_default();
		let target = match request.url.query() {
			Some(query) => format!("{segment}?{query}"),
			None => segment.to_string(),
		};

		self.requests.lock().push(RecordedRequest {
			method: request.method,
			target: target.clone(),
			body: request.body.as_deref().map(latin1::decode),
			cookie_header: request.cookie_header.clone(),
			keep_alive: request.keep_alive,
		});
		let reply = self.next_reply(&target);

		Box::pin(async move {
			tokio::task::yield_now().await;
			match reply {
				FakeReply::Respond {
					status,
					body,
					set_cookies,
				} => Ok(HttpResponse {
					status,
					body: latin1::encode_lossy(&body),
					set_cookies,
				}),
				FakeReply::Timeout => Err(TransportFailure::Timeout),
				FakeReply::NetworkError(reason) => Err(TransportFailure::Network(reason)),
			}
		})
	}
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
	Message(RemoteMessage),
	UserAppeared(KnownUser),
	Error { status: u16, body: String },
	Notice(Notice),
}

/// A [`ChatSink`] that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
	events: Mutex<Vec<SinkEvent>>,
	changed: Notify,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<SinkEvent> {
		self.events.lock().clone()
	}

	pub fn messages(&self) -> Vec<RemoteMessage> {
		self.filter(|event| match event {
			SinkEvent::Message(message) => Some(message.clone()),
			_ => None,
		})
	}

	pub fn users(&self) -> Vec<KnownUser> {
		self.filter(|event| match event {
			SinkEvent::UserAppeared(user) => Some(user.clone()),
			_ => None,
		})
	}

	pub fn errors(&self) -> Vec<(u16, String)> {
		self.filter(|event| match event {
			SinkEvent::Error { status, body } => Some((*status, body.clone())),
			_ => None,
		})
	}

	pub fn notices(&self) -> Vec<Notice> {
		self.filter(|event| match event {
			SinkEvent::Notice(notice) => Some(notice.clone()),
			_ => None,
		})
	}

	/// Waits until `condition` holds for the recorded events, up to `limit`.
	/// Returns whether it held.
	pub async fn wait_until(&self, limit: Duration, condition: impl Fn(&[SinkEvent]) -> bool) -> bool {
		let deadline = tokio::time::Instant::now() + limit;
		loop {
			let changed = self.changed.notified();
			if condition(&self.events.lock()) {
				return true;
			}
			if tokio::time::timeout_at(deadline, changed).await.is_err() {
				return condition(&self.events.lock());
			}
		}
	}

	fn filter<T>(&self, pick: impl Fn(&SinkEvent) -> Option<T>) -> Vec<T> {
		self.events.lock().iter().filter_map(pick).collect()
	}

	fn record(&self, event: SinkEvent) {
		self.events.lock().push(event);
		self.changed.notify_waiters();
	}
}

impl ChatSink for RecordingSink {
	fn on_message(&self, message: RemoteMessage) {
		self.record(SinkEvent::Message(message));
	}

	fn on_user_appeared(&self, user: KnownUser) {
		self.record(SinkEvent::UserAppeared(user));
	}

	fn on_error(&self, status: u16, body: &str) {
		self.record(SinkEvent::Error {
			status,
			body: body.to_string(),
		});
	}

	fn on_notice(&self, notice: Notice) {
		self.record(SinkEvent::Notice(notice));
	}
}
