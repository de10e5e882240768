//! `application/x-www-form-urlencoded` bodies for login and posting.
//!
//! Values are escaped with [`encoder::encode`](crate::encoder::encode), so
//! bodies are always plain ASCII and can be sent as-is.

use crate::encoder::encode;

pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of the login submission.
///
/// The md5 fields are left empty: the forum accepts the plain password when
/// they are blank.
pub fn login_body(username: &str, password: &str) -> String {
	let fields = [
		("vb_login_username", username),
		("vb_login_password", password),
		("cookieuser", "1"),
		("s", ""),
		("do", "login"),
		("vb_login_md5password", ""),
		("vb_login_md5password_utf", ""),
	];

	fields
		.iter()
		.map(|(name, value)| format!("{name}={}", encode(value)))
		.collect::<Vec<_>>()
		.join("&")
}

/// Body of a new chatbox message.
pub fn post_body(security_token: &str, message: &str) -> String {
	format!(
		"do=cb_postnew&securitytoken={}&vsacb_newmessage={}",
		encode(security_token),
		encode(message)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn login_body_carries_boilerplate_fields_in_order() {
		assert_eq!(
			login_body("alice", "p@ss word"),
			"vb_login_username=alice&vb_login_password=p%40ss%20word&cookieuser=1&s=&do=login\
			 &vb_login_md5password=&vb_login_md5password_utf="
		);
	}

	#[test]
	fn post_body_encodes_the_message() {
		assert_eq!(
			post_body("1700000000-abcdef", "hi \u{1F600}"),
			"do=cb_postnew&securitytoken=1700000000-abcdef&vsacb_newmessage=hi%20%26%23128512%3B"
		);
	}
}
