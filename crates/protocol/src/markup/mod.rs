//! Markup handling for forum pages and the chatbox feed.

mod dom;
pub mod text;

pub use dom::{Document, NodeId};

/// Name of the element [`wrap_fragment`] places around a feed fragment.
pub const FRAGMENT_ROOT: &str = "messages";

/// Wraps a feed fragment in a single synthetic root element, so the rows
/// it contains become children of one known element.
pub fn wrap_fragment(fragment: &str) -> String {
	format!("<{FRAGMENT_ROOT}>{fragment}</{FRAGMENT_ROOT}>")
}
