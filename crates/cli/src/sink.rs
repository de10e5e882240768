//! Terminal rendering of chat events.
//!
//! Chat lines go to stdout, status lines and feed errors to stderr.

use chrono::Local;
use colored::Colorize;
use vbchat::protocol::markup::text::plain_text;
use vbchat::{ChatSink, IdentityStyle, KnownUser, Notice, RemoteMessage};

#[derive(Debug, Default)]
pub struct TerminalSink;

impl TerminalSink {
	pub fn new() -> Self {
		Self
	}
}

impl ChatSink for TerminalSink {
	fn on_message(&self, message: RemoteMessage) {
		println!("{}", format_message(&message));
	}

	fn on_user_appeared(&self, user: KnownUser) {
		println!("{}", format_user(&user));
	}

	fn on_error(&self, status: u16, _body: &str) {
		eprintln!("{}", format_feed_error(status));
	}

	fn on_notice(&self, notice: Notice) {
		eprintln!("{}", format_notice(&notice));
	}
}

/// `[HH:MM] <nick> text`, in local time, with the own nickname highlighted.
pub fn format_message(message: &RemoteMessage) -> String {
	let time = message.timestamp.with_timezone(&Local).format("%H:%M");
	let nick = format!("<{}>", message.nickname);
	let nick = if message.from_self {
		nick.blue().bold()
	} else {
		nick.bold()
	};
	format!("{} {nick} {}", format!("[{time}]").dimmed(), plain_text(&message.body_html))
}

pub fn format_user(user: &KnownUser) -> String {
	let name = match user.style {
		IdentityStyle::Own => user.nickname.blue().bold(),
		IdentityStyle::Plain => user.nickname.normal(),
	};
	format!("{} {name} (#{})", "-->".dimmed(), user.user_id)
}

pub fn format_notice(notice: &Notice) -> String {
	match notice {
		Notice::SendFailed { .. } | Notice::OperationFailed { .. } | Notice::TokenMissing => {
			notice.to_string().yellow().to_string()
		}
		_ => notice.to_string().dimmed().to_string(),
	}
}

pub fn format_feed_error(status: u16) -> String {
	format!("Error reading from stream: {status}. Use /relogin to resume.")
		.red()
		.to_string()
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;

	fn plain() {
		colored::control::set_override(false);
	}

	fn message(from_self: bool) -> RemoteMessage {
		let timestamp = Local
			.with_ymd_and_hms(2024, 3, 18, 21, 7, 0)
			.earliest()
			.unwrap()
			.with_timezone(&Utc);
		RemoteMessage {
			id: 12,
			user_id: 3,
			nickname: "bob".into(),
			timestamp,
			body_html: "caf&#233;<br/>time &amp; <b>tea</b>".into(),
			from_self,
		}
	}

	#[test]
	fn messages_render_as_plain_text_lines() {
		plain();
		assert_eq!(format_message(&message(false)), "[21:07] <bob> café\ntime & tea");
	}

	#[test]
	fn users_and_errors_render() {
		plain();
		let user = KnownUser::new(3, "bob", "alice");
		assert_eq!(format_user(&user), "--> bob (#3)");
		assert_eq!(format_feed_error(401), "Error reading from stream: 401. Use /relogin to resume.");
		assert_eq!(format_notice(&Notice::LoggedIn), "Logged in.");
	}
}
