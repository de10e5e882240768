use chrono::{DateTime, Utc};

/// A chatbox message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
	pub id: u64,
	pub user_id: u64,
	pub nickname: String,
	pub timestamp: DateTime<Utc>,
	/// Message body markup, trimmed.
	pub body_html: String,
	/// Sent by the logged-in user.
	pub from_self: bool,
}

/// How a user's name should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityStyle {
	#[default]
	Plain,
	/// The logged-in user: blue, bold, no background.
	Own,
}

/// A chatbox participant seen in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
	pub user_id: u64,
	pub nickname: String,
	pub is_self: bool,
	pub style: IdentityStyle,
}

impl KnownUser {
	pub fn new(user_id: u64, nickname: impl Into<String>, own_username: &str) -> Self {
		let nickname = nickname.into();
		let is_self = nickname == own_username;
		Self {
			user_id,
			nickname,
			is_self,
			style: if is_self { IdentityStyle::Own } else { IdentityStyle::Plain },
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn own_user_gets_the_own_style() {
		let me = KnownUser::new(1, "alice", "alice");
		assert!(me.is_self);
		assert_eq!(me.style, IdentityStyle::Own);

		let other = KnownUser::new(2, "Alice", "alice");
		assert!(!other.is_self);
		assert_eq!(other.style, IdentityStyle::Plain);
	}
}
