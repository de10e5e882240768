//! Single request/response exchanges with the forum.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use url::Url;
use vbchat_protocol::{Endpoint, form, latin1};

use crate::cookies::CookieJar;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, Method, Transport};

/// State shared by every request of one forum session.
///
/// Guarded by a single lock: requests snapshot the cookies under it, and
/// responses merge their cookies back under it. The lock is never held
/// across network I/O.
#[derive(Debug, Default)]
pub struct SessionData {
	pub cookies: CookieJar,
	pub security_token: Option<String>,
	/// Set by a login; the token must be fetched again before it is used.
	pub token_stale: bool,
}

pub type SharedSessionData = Arc<Mutex<SessionData>>;

/// What to fetch.
#[derive(Debug, Clone)]
pub struct Fetch {
	endpoint: Endpoint,
	body: Option<String>,
	keep_alive: bool,
}

impl Fetch {
	pub fn get(endpoint: Endpoint) -> Self {
		Self {
			endpoint,
			body: None,
			keep_alive: true,
		}
	}

	/// A form POST; `body` must already be form-encoded.
	pub fn post(endpoint: Endpoint, body: String) -> Self {
		Self {
			endpoint,
			body: Some(body),
			keep_alive: true,
		}
	}

	/// Ask for the connection to be closed after this exchange.
	pub fn non_persistent(mut self) -> Self {
		self.keep_alive = false;
		self
	}
}

/// A fetched page, decoded from ISO-8859-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
	pub status: u16,
	pub body: String,
}

#[derive(Clone)]
pub struct DocumentFetcher {
	transport: Arc<dyn Transport>,
	forum: Url,
	timeout: Duration,
	shared: SharedSessionData,
}

impl DocumentFetcher {
	/// `forum` must be the forum root with a trailing slash.
	pub fn new(transport: Arc<dyn Transport>, forum: Url, timeout: Duration, shared: SharedSessionData) -> Self {
		Self {
			transport,
			forum,
			timeout,
			shared,
		}
	}

	pub fn forum(&self) -> &Url {
		&self.forum
	}

	/// Performs one exchange and returns the page whatever its status.
	///
	/// Fails only on network-level problems (`Timeout`, `Transport`). No
	/// retries are made.
	pub async fn fetch(&self, request: Fetch) -> Result<Page> {
		let url = self.forum.join(request.endpoint.path())?;
		let method = if request.body.is_some() { Method::Post } else { Method::Get };
		let cookie_header = self.shared.lock().cookies.header_for(&url);

		let http = HttpRequest {
			method,
			url: url.clone(),
			content_type: request.body.is_some().then_some(form::CONTENT_TYPE),
			body: request.body.map(|body| latin1::encode_lossy(&body)),
			cookie_header,
			timeout: self.timeout,
			keep_alive: request.keep_alive,
		};

		debug!(target: "vbchat.http", ?method, path = request.endpoint.path(), "sending request");
		let response = self.transport.execute(http).await.inspect_err(|failure| {
			debug!(target: "vbchat.http", path = request.endpoint.path(), error = %failure, "request failed");
		})?;

		if !response.set_cookies.is_empty() {
			let shared = self.shared.lock();
			for set_cookie in &response.set_cookies {
				shared.cookies.store(&url, set_cookie);
			}
		}

		debug!(
			target: "vbchat.http",
			path = request.endpoint.path(),
			status = response.status,
			bytes = response.body.len(),
			"response received"
		);
		Ok(Page {
			status: response.status,
			body: latin1::decode(&response.body),
		})
	}

	/// Like [`fetch`](Self::fetch), but turns error statuses into errors:
	/// 401 and 403 become [`Error::AuthChallenge`], any other status of 400
	/// or above becomes [`Error::Transport`].
	pub async fn fetch_checked(&self, request: Fetch) -> Result<Page> {
		let page = self.fetch(request).await?;
		match page.status {
			401 | 403 => Err(Error::AuthChallenge {
				status: page.status,
				body: page.body,
			}),
			status if status >= 400 => Err(Error::Transport(format!("HTTP {status}"))),
			_ => Ok(page),
		}
	}
}
