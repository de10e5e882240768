//! Login and security token upkeep.

use std::sync::Arc;

use tracing::{info, warn};
use vbchat_protocol::{Endpoint, TokenPage, extract_security_token, form};

use crate::error::{Error, Result};
use crate::fetcher::{DocumentFetcher, Fetch, SharedSessionData};
use crate::sink::{ChatSink, Notice};

/// Owns the credentials and keeps the shared session data usable.
///
/// `login` and `refresh_token` can be called any number of times. Whole
/// sequences (a login, a refresh, or [`reconnect`](Self::reconnect)) run one
/// at a time so that concurrent commands never interleave their requests.
pub struct SessionState {
	fetcher: DocumentFetcher,
	shared: SharedSessionData,
	username: String,
	password: String,
	token_page: TokenPage,
	sink: Arc<dyn ChatSink>,
	lifecycle: tokio::sync::Mutex<()>,
}

impl SessionState {
	pub fn new(
		fetcher: DocumentFetcher,
		shared: SharedSessionData,
		username: impl Into<String>,
		password: impl Into<String>,
		token_page: TokenPage,
		sink: Arc<dyn ChatSink>,
	) -> Self {
		Self {
			fetcher,
			shared,
			username: username.into(),
			password: password.into(),
			token_page,
			sink,
			lifecycle: tokio::sync::Mutex::new(()),
		}
	}

	/// Submits the login form.
	///
	/// Any answer counts as success; the forum gives no reliable signal and
	/// its cookies are kept either way. Only network failures are errors.
	pub async fn login(&self) -> Result<()> {
		let _gate = self.lifecycle.lock().await;
		self.login_locked().await
	}

	/// Fetches the token page and stores the token found on it.
	///
	/// On failure the previous token stays in place.
	pub async fn refresh_token(&self) -> Result<String> {
		let _gate = self.lifecycle.lock().await;
		self.refresh_token_locked().await
	}

	/// Logs in and fetches a fresh token, as one uninterrupted sequence.
	pub async fn reconnect(&self) -> Result<String> {
		let _gate = self.lifecycle.lock().await;
		self.login_locked().await?;
		self.refresh_token_locked().await
	}

	/// The token to post with, unless it is missing or predates the last login.
	pub fn current_token(&self) -> Option<String> {
		let shared = self.shared.lock();
		if shared.token_stale {
			return None;
		}
		shared.security_token.clone()
	}

	async fn login_locked(&self) -> Result<()> {
		self.sink.on_notice(Notice::LoggingIn {
			forum: self.fetcher.forum().to_string(),
		});
		info!(target: "vbchat.session", username = %self.username, forum = %self.fetcher.forum(), "logging in");

		let body = form::login_body(&self.username, &self.password);
		let page = self.fetcher.fetch(Fetch::post(Endpoint::Login, body)).await?;

		self.shared.lock().token_stale = true;
		info!(target: "vbchat.session", status = page.status, "login submitted");
		self.sink.on_notice(Notice::LoggedIn);
		Ok(())
	}

	async fn refresh_token_locked(&self) -> Result<String> {
		self.sink.on_notice(Notice::FetchingToken);
		let endpoint = self.token_page.endpoint();
		let page = self.fetcher.fetch_checked(Fetch::get(endpoint)).await?;

		let Some(token) = extract_security_token(&page.body) else {
			warn!(target: "vbchat.session", page = endpoint.path(), "security token not found");
			self.sink.on_notice(Notice::TokenMissing);
			return Err(Error::ProtocolViolation(format!(
				"no security token on {}",
				endpoint.path()
			)));
		};

		{
			let mut shared = self.shared.lock();
			shared.security_token = Some(token.clone());
			shared.token_stale = false;
		}
		info!(target: "vbchat.session", page = endpoint.path(), "security token refreshed");
		self.sink.on_notice(Notice::TokenFetched);
		Ok(token)
	}
}
