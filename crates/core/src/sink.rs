use std::fmt;

use vbchat_protocol::{KnownUser, RemoteMessage};

/// Receiver of everything the client produces.
///
/// Calls are made synchronously from whichever task produced the event and
/// must return promptly.
pub trait ChatSink: Send + Sync {
	fn on_message(&self, message: RemoteMessage);

	fn on_user_appeared(&self, user: KnownUser);

	/// The forum refused the message feed. Polling has stopped.
	fn on_error(&self, status: u16, body: &str);

	/// A user-visible status line.
	fn on_notice(&self, _notice: Notice) {}
}

/// Status lines reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
	LoggingIn { forum: String },
	LoggedIn,
	FetchingToken,
	TokenFetched,
	/// The token page had no token. The previous token stays in use.
	TokenMissing,
	/// A message could not be delivered. `status` is set when the forum
	/// answered, `reason` holds the status reason or the failure.
	SendFailed { status: Option<u16>, reason: String },
	/// A relogin or token refresh gave up.
	OperationFailed { operation: &'static str, reason: String },
	UnknownCommand(String),
	Help,
}

impl fmt::Display for Notice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LoggingIn { forum } => write!(f, "Logging in to VBulletin Chatbox at {forum}..."),
			Self::LoggedIn => f.write_str("Logged in."),
			Self::FetchingToken => f.write_str("Fetching security token..."),
			Self::TokenFetched => f.write_str("Security token fetched."),
			Self::TokenMissing => f.write_str("Security token not found; keeping the previous one."),
			Self::SendFailed { status: Some(status), reason } => {
				write!(f, "Failed to send message; HTTP error code: [{status}] {reason}")
			}
			Self::SendFailed { status: None, reason } => write!(f, "Failed to send message: {reason}"),
			Self::OperationFailed { operation, reason } => write!(f, "{operation} failed: {reason}"),
			Self::UnknownCommand(name) => write!(f, "Unknown command: /{name}"),
			Self::Help => write!(f, "Commands: {}", crate::command::COMMAND_NAMES.join(", ")),
		}
	}
}
