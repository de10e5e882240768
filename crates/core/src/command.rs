//! User commands.
//!
//! A line of input is either chat text or a slash command. `/me` is the
//! forum's own action syntax and goes out verbatim.

/// Command names listed by `/help`.
pub const COMMAND_NAMES: &[&str] = &["help", "me", "quit", "relogin", "retoken", "say"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Post this text to the chatbox.
	Say(String),
	Help,
	Relogin,
	Retoken,
	Quit,
	/// A slash command nobody handles, by name.
	Unknown(String),
}

impl Command {
	/// Parses one line of input. Blank lines yield `None`.
	pub fn parse(line: &str) -> Option<Self> {
		let line = line.trim_end_matches(['\r', '\n']);
		if line.trim().is_empty() {
			return None;
		}

		let Some(rest) = line.strip_prefix('/') else {
			return Some(Self::Say(line.to_string()));
		};
		let (name, argument) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

		Some(match name.to_ascii_lowercase().as_str() {
			"me" => Self::Say(line.to_string()),
			"say" => {
				let text = argument.trim_start();
				if text.is_empty() {
					return None;
				}
				Self::Say(text.to_string())
			}
			"help" => Self::Help,
			"relogin" => Self::Relogin,
			"retoken" => Self::Retoken,
			"quit" => Self::Quit,
			_ => Self::Unknown(name.to_string()),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_text_is_said() {
		assert_eq!(Command::parse("hello there\n"), Some(Command::Say("hello there".into())));
	}

	#[test]
	fn me_is_sent_verbatim() {
		assert_eq!(Command::parse("/me waves"), Some(Command::Say("/me waves".into())));
	}

	#[test]
	fn say_sends_its_argument() {
		assert_eq!(Command::parse("/say /quit is a command"), Some(Command::Say("/quit is a command".into())));
		assert_eq!(Command::parse("/say"), None);
	}

	#[test]
	fn control_commands_are_recognised() {
		assert_eq!(Command::parse("/help"), Some(Command::Help));
		assert_eq!(Command::parse("/RELOGIN"), Some(Command::Relogin));
		assert_eq!(Command::parse("/retoken"), Some(Command::Retoken));
		assert_eq!(Command::parse("/quit now"), Some(Command::Quit));
		assert_eq!(Command::parse("/join #x"), Some(Command::Unknown("join".into())));
	}

	#[test]
	fn blank_lines_are_ignored() {
		assert_eq!(Command::parse(""), None);
		assert_eq!(Command::parse("   \r\n"), None);
	}
}
