//! ISO-8859-1 conversions.
//!
//! Every request and response body in the chatbox protocol is ISO-8859-1.
//! Each byte maps to the code point of the same value, so decoding never
//! fails and encoding fails only for code points above U+00FF.

/// Decodes ISO-8859-1 bytes into a string.
pub fn decode(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| char::from(b)).collect()
}

/// Returns the ISO-8859-1 byte for `c`, if the encoding can represent it.
pub fn encode_char(c: char) -> Option<u8> {
	u8::try_from(u32::from(c)).ok()
}

/// Encodes `text` as ISO-8859-1, replacing unrepresentable characters with `?`.
pub fn encode_lossy(text: &str) -> Vec<u8> {
	text.chars().map(|c| encode_char(c).unwrap_or(b'?')).collect()
}
