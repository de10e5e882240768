//! Security token extraction from forum pages.

use crate::markup::Document;

const FIELD: &str = "securitytoken";

/// Finds the anti-forgery token in a forum page.
///
/// The first `<input name="securitytoken">` wins; its value may be empty
/// (guests get an empty token on some installs). Pages that only carry the
/// token inside a form target (`<form action="...?securitytoken=...">`) are
/// accepted too. Returns `None` when the page has neither.
pub fn extract_security_token(html: &str) -> Option<String> {
	let doc = Document::parse(html);
	let root = doc.root();

	let from_input = doc
		.descendants_named(root, "input")
		.into_iter()
		.find(|&input| doc.attr(input, "name").is_some_and(|name| name.eq_ignore_ascii_case(FIELD)))
		.map(|input| doc.attr(input, "value").unwrap_or_default().to_string());
	if from_input.is_some() {
		return from_input;
	}

	doc.descendants_named(root, "form")
		.into_iter()
		.filter_map(|form| doc.attr(form, "action"))
		.find_map(token_from_query)
}

fn token_from_query(target: &str) -> Option<String> {
	let (_, query) = target.split_once('?')?;
	query.split('&').find_map(|pair| {
		let (key, value) = pair.split_once('=')?;
		(key == FIELD).then(|| value.to_string())
	})
}
