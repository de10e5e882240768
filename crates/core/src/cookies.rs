//! Cookie storage for the forum session.
//!
//! A thin layer over `reqwest`'s cookie store, fed from the raw
//! `Set-Cookie` values of each response and rendered into a `Cookie`
//! header for each request. Scoping and expiry follow RFC 6265.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use tracing::trace;
use url::Url;

#[derive(Debug, Default)]
pub struct CookieJar {
	jar: Jar,
}

impl CookieJar {
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies one `Set-Cookie` header received in answer to `url`.
	///
	/// Malformed headers and cookies for a foreign domain are ignored.
	pub fn store(&self, url: &Url, set_cookie: &str) {
		let Ok(value) = HeaderValue::from_str(set_cookie) else {
			trace!(target: "vbchat.http", "ignoring unrepresentable Set-Cookie header");
			return;
		};
		self.jar.set_cookies(&mut std::iter::once(&value), url);
	}

	/// Renders the `Cookie` header for a request to `url`.
	pub fn header_for(&self, url: &Url) -> Option<String> {
		self.jar
			.cookies(url)
			.and_then(|value| value.to_str().ok().map(str::to_string))
	}

	/// Number of cookies a request to `url` would carry.
	pub fn count_for(&self, url: &Url) -> usize {
		self.header_for(url).map_or(0, |header| header.split("; ").count())
	}
}
