use reqwest::header::{CONNECTION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use tracing::trace;

use super::{HttpRequest, HttpResponse, Method, Transport, TransportFailure, TransportFuture};
use crate::error::{Error, Result};

/// [`Transport`] backed by a `reqwest` client with redirects disabled.
///
/// Cookie handling is left to the caller: the client keeps no cookie store
/// of its own, so `Set-Cookie` headers of redirect responses (the login
/// answer is usually one) reach the session intact.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn new() -> Result<Self> {
		let client = reqwest::Client::builder()
			.redirect(Policy::none())
			.user_agent(concat!("vbchat/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::Transport(format!("failed to create HTTP client: {e}")))?;
		Ok(Self { client })
	}
}

impl Transport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = match request.method {
				Method::Get => self.client.get(request.url),
				Method::Post => self.client.post(request.url),
			}
			.timeout(request.timeout);

			if let Some(cookies) = request.cookie_header {
				builder = builder.header(COOKIE, cookies);
			}
			if let Some(content_type) = request.content_type {
				builder = builder.header(CONTENT_TYPE, content_type);
			}
			if !request.keep_alive {
				builder = builder.header(CONNECTION, "close");
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(classify)?;
			let status = response.status().as_u16();
			let set_cookies = response
				.headers()
				.get_all(SET_COOKIE)
				.iter()
				.filter_map(|value| value.to_str().ok())
				.map(str::to_string)
				.collect();
			let body = response.bytes().await.map_err(classify)?.to_vec();
			trace!(target: "vbchat.http", status, bytes = body.len(), "response received");

			Ok(HttpResponse { status, body, set_cookies })
		})
	}
}

fn classify(err: reqwest::Error) -> TransportFailure {
	if err.is_timeout() {
		TransportFailure::Timeout
	} else {
		TransportFailure::Network(err.to_string())
	}
}
