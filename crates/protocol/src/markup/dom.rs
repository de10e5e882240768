//! A lenient element tree over forum markup.
//!
//! The chatbox feed is an HTML fragment, not a well-formed document: rows
//! and cells are frequently left unclosed and attribute values are not
//! always quoted. The parser here never fails. It builds a tree of elements
//! with source spans so callers can read both the structure and the raw
//! inner markup of any element.
//!
//! Recovery rules:
//! - comments, doctypes and processing instructions are skipped
//! - `script` and `style` content is raw text
//! - void elements (`br`, `img`, `input`, ...) and `<x/>` never take children
//! - an opening `td`/`th` closes an open cell of the same row
//! - an opening `tr` closes an open row of the same table
//! - a stray end tag is ignored; an end tag closes every element opened
//!   inside the one it matches
//! - anything still open at the end of input ends there

use std::sync::LazyLock;

use regex::Regex;

use super::text;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"^<(/)?([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("TAG regex should compile")
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
		.expect("ATTRIBUTE regex should compile")
});

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "hr", "img", "input", "link", "meta", "param", "wbr"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];
const ROOT_NAME: &str = "#root";

/// Handle to an element of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Element {
	name: String,
	attributes: Vec<(String, String)>,
	parent: Option<usize>,
	children: Vec<usize>,
	inner_start: usize,
	inner_end: usize,
}

/// A parsed markup tree.
#[derive(Debug)]
pub struct Document {
	source: String,
	elements: Vec<Element>,
}

impl Document {
	/// Parses `source`, recovering from malformed markup.
	pub fn parse(source: impl Into<String>) -> Self {
		let source = source.into();
		let mut builder = Builder::new(source.len());
		builder.run(&source);
		Self {
			source,
			elements: builder.elements,
		}
	}

	/// The synthetic element containing every top-level node.
	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	/// Lowercase tag name.
	pub fn name(&self, node: NodeId) -> &str {
		&self.elements[node.0].name
	}

	/// Attribute value with references decoded. Names are case-insensitive.
	/// An attribute present without a value yields `Some("")`.
	pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
		self.elements[node.0]
			.attributes
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.elements[node.0].parent.map(NodeId)
	}

	/// Direct child elements, in document order.
	pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.elements[node.0].children.iter().map(|&i| NodeId(i))
	}

	/// Direct child elements with the given tag name.
	pub fn children_named<'a>(&'a self, node: NodeId, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
		self.children(node).filter(move |&child| self.name(child).eq_ignore_ascii_case(name))
	}

	/// Every element below `node`, in document order.
	pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut pending: Vec<usize> = self.elements[node.0].children.iter().rev().copied().collect();
		while let Some(index) = pending.pop() {
			out.push(NodeId(index));
			pending.extend(self.elements[index].children.iter().rev().copied());
		}
		out
	}

	/// Elements below `node` with the given tag name, in document order.
	pub fn descendants_named(&self, node: NodeId, name: &str) -> Vec<NodeId> {
		self.descendants(node)
			.into_iter()
			.filter(|&d| self.name(d).eq_ignore_ascii_case(name))
			.collect()
	}

	/// Raw markup between the element's start and end tags.
	pub fn inner_html(&self, node: NodeId) -> &str {
		let element = &self.elements[node.0];
		&self.source[element.inner_start..element.inner_end]
	}

	/// Text content of the element with tags removed and references decoded.
	pub fn inner_text(&self, node: NodeId) -> String {
		text::plain_text(self.inner_html(node))
	}
}

struct Builder {
	elements: Vec<Element>,
	open: Vec<usize>,
}

impl Builder {
	fn new(len: usize) -> Self {
		let root = Element {
			name: ROOT_NAME.to_string(),
			attributes: Vec::new(),
			parent: None,
			children: Vec::new(),
			inner_start: 0,
			inner_end: len,
		};
		Self {
			elements: vec![root],
			open: vec![0],
		}
	}

	fn run(&mut self, source: &str) {
		let mut pos = 0;

		while let Some(offset) = source[pos..].find('<') {
			let at = pos + offset;
			let rest = &source[at..];

			if let Some(comment) = rest.strip_prefix("<!--") {
				pos = comment.find("-->").map_or(source.len(), |end| at + 4 + end + 3);
				continue;
			}
			if rest.starts_with("<!") || rest.starts_with("<?") {
				pos = rest.find('>').map_or(source.len(), |end| at + end + 1);
				continue;
			}

			let Some(caps) = TAG.captures(rest) else {
				pos = at + 1;
				continue;
			};
			let tag_end = at + caps[0].len();
			let name = caps[2].to_ascii_lowercase();

			if caps.get(1).is_some() {
				self.close(&name, at);
				pos = tag_end;
				continue;
			}

			let raw_attributes = caps.get(3).map_or("", |m| m.as_str());
			self.close_implied(&name, at);
			let index = self.push(&name, parse_attributes(raw_attributes), tag_end);

			if VOID_ELEMENTS.contains(&name.as_str()) || raw_attributes.trim_end().ends_with('/') {
				pos = tag_end;
			} else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
				let lowered = source[tag_end..].to_ascii_lowercase();
				match lowered.find(&format!("</{name}")) {
					Some(end) => {
						let close_at = tag_end + end;
						self.elements[index].inner_end = close_at;
						pos = source[close_at..].find('>').map_or(source.len(), |gt| close_at + gt + 1);
					}
					None => {
						self.elements[index].inner_end = source.len();
						pos = source.len();
					}
				}
			} else {
				self.open.push(index);
				pos = tag_end;
			}
		}

		let len = source.len();
		for index in self.open.drain(1..) {
			self.elements[index].inner_end = len;
		}
	}

	fn push(&mut self, name: &str, attributes: Vec<(String, String)>, tag_end: usize) -> usize {
		let parent = self.open.last().copied().unwrap_or(0);
		let index = self.elements.len();
		self.elements.push(Element {
			name: name.to_string(),
			attributes,
			parent: Some(parent),
			children: Vec::new(),
			inner_start: tag_end,
			inner_end: tag_end,
		});
		self.elements[parent].children.push(index);
		index
	}

	/// Closes the innermost open `name` and everything opened inside it.
	fn close(&mut self, name: &str, at: usize) {
		let found = self.open.iter().skip(1).rposition(|&i| self.elements[i].name == name);
		if let Some(position) = found {
			self.truncate_open(position + 1, at);
		}
	}

	fn close_implied(&mut self, name: &str, at: usize) {
		let (targets, boundaries): (&[&str], &[&str]) = match name {
			"td" | "th" => (&["td", "th"], &["tr", "table"]),
			"tr" => (&["tr"], &["table", "thead", "tbody", "tfoot"]),
			_ => return,
		};

		for position in (1..self.open.len()).rev() {
			let open_name = self.elements[self.open[position]].name.as_str();
			if boundaries.contains(&open_name) {
				return;
			}
			if targets.contains(&open_name) {
				self.truncate_open(position, at);
				return;
			}
		}
	}

	fn truncate_open(&mut self, from: usize, at: usize) {
		for index in self.open.drain(from..) {
			self.elements[index].inner_end = at;
		}
	}
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
	ATTRIBUTE
		.captures_iter(raw)
		.map(|caps| {
			let value = caps
				.get(2)
				.or_else(|| caps.get(3))
				.or_else(|| caps.get(4))
				.map_or(String::new(), |m| text::decode_entities(m.as_str()));
			(caps[1].to_ascii_lowercase(), value)
		})
		.collect()
}
