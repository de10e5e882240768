//! Text cleanup helpers for forum markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,7});").expect("ENTITY regex should compile"));
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK regex should compile"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("TAG regex should compile"));
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\u{a0}]+").expect("MULTI_SPACE regex should compile"));
static MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n[ \n]*").expect("MULTI_NEWLINE regex should compile"));

/// Decodes named and numeric HTML character references.
///
/// Unknown named references and numeric references to invalid code points
/// are left untouched.
pub fn decode_entities(s: &str) -> String {
	if !s.contains('&') {
		return s.to_string();
	}

	ENTITY
		.replace_all(s, |caps: &Captures<'_>| {
			let reference = &caps[1];
			let decoded = match reference.strip_prefix('#') {
				Some(numeric) => {
					let code_point = match numeric.strip_prefix(['x', 'X']) {
						Some(hex) => u32::from_str_radix(hex, 16).ok(),
						None => numeric.parse::<u32>().ok(),
					};
					code_point.and_then(char::from_u32).map(String::from)
				}
				None => named_entity(reference).map(String::from),
			};
			decoded.unwrap_or_else(|| caps[0].to_string())
		})
		.into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
	Some(match name {
		"amp" => "&",
		"lt" => "<",
		"gt" => ">",
		"quot" => "\"",
		"apos" => "'",
		"nbsp" => "\u{a0}",
		"copy" => "\u{a9}",
		"reg" => "\u{ae}",
		"laquo" => "\u{ab}",
		"raquo" => "\u{bb}",
		"hellip" => "\u{2026}",
		"mdash" => "\u{2014}",
		"ndash" => "\u{2013}",
		_ => return None,
	})
}

/// Renders a markup fragment as a single block of plain text.
///
/// Line breaks become newlines, every other tag is dropped, references are
/// decoded and runs of whitespace are collapsed.
pub fn plain_text(html: &str) -> String {
	let with_breaks = LINE_BREAK.replace_all(html, "\n");
	let stripped = TAG.replace_all(&with_breaks, "");
	let decoded = decode_entities(&stripped);
	collapse_whitespace(&decoded).trim().to_string()
}

/// Collapse runs of spaces and blank lines.
pub fn collapse_whitespace(s: &str) -> String {
	let result = MULTI_SPACE.replace_all(s, " ");
	MULTI_NEWLINE.replace_all(&result, "\n").into_owned()
}
