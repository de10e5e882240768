//! Outgoing message encoder.
//!
//! The chatbox accepts message text as a form value in ISO-8859-1. Characters
//! the encoding cannot carry are sent as HTML numeric character references,
//! which the forum renders back into the original character:
//!
//! | input                         | output                        |
//! |-------------------------------|-------------------------------|
//! | `A-Z a-z 0-9 - _ .`           | unchanged                     |
//! | other code point <= U+00FF    | `%XX` of the ISO-8859-1 byte  |
//! | anything else                 | `%26%23<decimal>%3B`          |
//!
//! Input is processed as UTF-16 code units. A high surrogate directly
//! followed by a low surrogate is combined into one code point; an unpaired
//! high surrogate produces no output, and an unpaired low surrogate is
//! emitted as a numeric reference to its own value.

use std::fmt::Write;

use crate::latin1;

/// Encodes `text` into a form-value fragment.
pub fn encode(text: &str) -> String {
	let units: Vec<u16> = text.encode_utf16().collect();
	encode_utf16_units(&units)
}

/// Encodes a sequence of UTF-16 code units into a form-value fragment.
///
/// This is the primitive behind [`encode`]; it exists separately so that
/// input which is not valid UTF-16 (unpaired surrogates) can be handled.
pub fn encode_utf16_units(units: &[u16]) -> String {
	let mut out = String::with_capacity(units.len() * 3);
	let mut i = 0;

	while i < units.len() {
		let unit = units[i];
		match unit {
			0xD800..=0xDBFF => {
				if let Some(&low @ 0xDC00..=0xDFFF) = units.get(i + 1) {
					push_numeric_reference(&mut out, combine_surrogates(unit, low));
					i += 2;
					continue;
				}
				// unpaired high surrogate: nothing to emit
			}
			0xDC00..=0xDFFF => push_numeric_reference(&mut out, u32::from(unit)),
			_ => push_bmp(&mut out, unit),
		}
		i += 1;
	}

	out
}

fn combine_surrogates(high: u16, low: u16) -> u32 {
	(((u32::from(high) - 0xD800) << 10) | (u32::from(low) - 0xDC00)) + 0x10000
}

fn push_bmp(out: &mut String, unit: u16) {
	let Some(c) = char::from_u32(u32::from(unit)) else {
		push_numeric_reference(out, u32::from(unit));
		return;
	};

	if is_unreserved(c) {
		out.push(c);
	} else if let Some(byte) = latin1::encode_char(c) {
		let _ = write!(out, "%{byte:02X}");
	} else {
		push_numeric_reference(out, u32::from(c));
	}
}

fn push_numeric_reference(out: &mut String, code_point: u32) {
	let _ = write!(out, "%26%23{code_point}%3B");
}

fn is_unreserved(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
