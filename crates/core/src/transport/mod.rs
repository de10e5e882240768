//! HTTP transport seam.
//!
//! The client never talks to an HTTP library directly. Requests are fully
//! described by [`HttpRequest`] (cookies already rendered into a header,
//! body already encoded) and executed by a [`Transport`], so the same code
//! paths run against [`ReqwestTransport`] in production and
//! [`FakeTransport`](crate::fake::FakeTransport) in tests.

mod reqwest_transport;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use reqwest_transport::ReqwestTransport;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
}

/// A single request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
	pub method: Method,
	pub url: Url,
	pub body: Option<Vec<u8>>,
	pub content_type: Option<&'static str>,
	pub cookie_header: Option<String>,
	pub timeout: Duration,
	/// `false` asks for the connection to be closed after the response.
	pub keep_alive: bool,
}

/// Response as received. Redirects are never followed.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Vec<u8>,
	/// Raw `Set-Cookie` header values.
	pub set_cookies: Vec<String>,
}

/// Network-level failure. Any HTTP status, including 5xx, is a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
	#[error("timed out")]
	Timeout,
	#[error("{0}")]
	Network(String),
}

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, TransportFailure>> + Send + 'a>>;

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}
