//! Row extraction from the chatbox message feed.
//!
//! `misc.php?show=ccbmessages` answers with a bare run of `<tr>` fragments,
//! newest first. Each row carries two cells:
//!
//! ```html
//! <tr>
//!   <td>[18-03-24, 21:07] <a href="misc.php?ccbloc=1234">#</a>
//!       <a href="member.php?u=42"><font color="red">alice</font></a></td>
//!   <td>message <b>body</b></td>
//! </tr>
//! ```

use crate::markup::{self, Document, NodeId};

pub const MESSAGE_LINK: &str = "misc.php?ccbloc=";
pub const MEMBER_LINK: &str = "member.php?u=";

/// One feed row as found in the markup, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRow {
	pub message_id: Option<u64>,
	pub user_id: Option<u64>,
	pub nickname: String,
	/// Inner markup of the first cell, where the timestamp lives.
	pub meta_html: String,
	/// Inner markup of the second cell, trimmed.
	pub body_html: String,
}

impl ChatRow {
	/// Both identifiers, or `None` for a malformed row.
	pub fn ids(&self) -> Option<(u64, u64)> {
		Some((self.message_id?, self.user_id?))
	}
}

/// Extracts every row of a feed response body, in feed order.
pub fn parse_feed(fragment: &str) -> Vec<ChatRow> {
	let doc = Document::parse(markup::wrap_fragment(fragment));
	let Some(messages) = doc.children_named(doc.root(), markup::FRAGMENT_ROOT).next() else {
		return Vec::new();
	};

	doc.children_named(messages, "tr")
		.filter_map(|row| parse_row(&doc, row))
		.collect()
}

fn parse_row(doc: &Document, row: NodeId) -> Option<ChatRow> {
	let mut cells = doc.children_named(row, "td");
	let meta = cells.next()?;
	let body_html = cells.next().map(|body| doc.inner_html(body).trim().to_string()).unwrap_or_default();

	let member_link = find_link(doc, meta, MEMBER_LINK);
	Some(ChatRow {
		message_id: find_link(doc, meta, MESSAGE_LINK).and_then(|link| link_id(doc, link, MESSAGE_LINK)),
		user_id: member_link.and_then(|link| link_id(doc, link, MEMBER_LINK)),
		nickname: member_link.map(|link| doc.inner_text(link)).unwrap_or_default(),
		meta_html: doc.inner_html(meta).to_string(),
		body_html,
	})
}

/// First anchor below `scope` whose `href` contains `specifier`.
fn find_link(doc: &Document, scope: NodeId, specifier: &str) -> Option<NodeId> {
	doc.descendants_named(scope, "a")
		.into_iter()
		.find(|&a| doc.attr(a, "href").is_some_and(|href| href.contains(specifier)))
}

/// The number following `specifier` in the link target; the remainder of the
/// target must be exactly that number.
fn link_id(doc: &Document, link: NodeId, specifier: &str) -> Option<u64> {
	let href = doc.attr(link, "href")?;
	let start = href.find(specifier)? + specifier.len();
	href[start..].trim().parse().ok()
}
