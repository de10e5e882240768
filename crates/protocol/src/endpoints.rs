//! Forum endpoints used by the chatbox client.
//!
//! Paths are relative to the forum root (the directory holding
//! `forumdisplay.php`, `misc.php` and friends).

/// A request target on the forum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	/// `POST login.php?do=login`
	Login,
	/// `GET faq.php`, any page embedding a `securitytoken` hidden input
	FaqPage,
	/// `GET misc.php?do=cchatbox`, the standalone chatbox page of older installs
	ChatboxPage,
	/// `GET misc.php?show=ccbmessages`, the message feed
	Messages,
	/// `POST misc.php`, new chatbox message
	Post,
}

impl Endpoint {
	/// Path and query relative to the forum root.
	pub fn path(self) -> &'static str {
		match self {
			Self::Login => "login.php?do=login",
			Self::FaqPage => "faq.php",
			Self::ChatboxPage => "misc.php?do=cchatbox",
			Self::Messages => "misc.php?show=ccbmessages",
			Self::Post => "misc.php",
		}
	}
}

/// Which page is fetched to obtain the security token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPage {
	/// `faq.php`: a hidden `securitytoken` input in the page's forms.
	#[default]
	Faq,
	/// `misc.php?do=cchatbox`: the token is carried in the chatbox form.
	Chatbox,
}

impl TokenPage {
	pub fn endpoint(self) -> Endpoint {
		match self {
			Self::Faq => Endpoint::FaqPage,
			Self::Chatbox => Endpoint::ChatboxPage,
		}
	}
}

impl std::str::FromStr for TokenPage {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"faq" => Ok(Self::Faq),
			"chatbox" | "cchatbox" => Ok(Self::Chatbox),
			other => Err(format!("unknown token page '{other}' (expected 'faq' or 'chatbox')")),
		}
	}
}
