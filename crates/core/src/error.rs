//! Error types for the chatbox client.

use thiserror::Error;

use crate::transport::TransportFailure;

/// Errors produced by fetching, session upkeep, polling and sending.
///
/// `Timeout` and `Transport` are network-level and assumed transient;
/// the rest describe what the forum answered.
#[derive(Debug, Error)]
pub enum Error {
	#[error("request timed out")]
	Timeout,

	#[error("transport error: {0}")]
	Transport(String),

	/// The forum answered 401 or 403.
	#[error("authentication required (HTTP {status})")]
	AuthChallenge { status: u16, body: String },

	/// An element the protocol relies on is missing from a page.
	#[error("protocol violation: {0}")]
	ProtocolViolation(String),

	/// The forum did not accept a posted message.
	#[error("message rejected (HTTP {status})")]
	SendRejected { status: u16, body: String },

	#[error("invalid forum URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("client stopped")]
	Stopped,
}

impl Error {
	/// Whether this is a network-level failure rather than a forum answer.
	pub fn is_network(&self) -> bool {
		matches!(self, Self::Timeout | Self::Transport(_))
	}
}

impl From<TransportFailure> for Error {
	fn from(failure: TransportFailure) -> Self {
		match failure {
			TransportFailure::Timeout => Self::Timeout,
			TransportFailure::Network(reason) => Self::Transport(reason),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
