use crate::error::{Error, ResolutionFailure, Result};

/// How a bracket tag behaves in the rewrite loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
	/// `[!key]`: resolved now, rendered nowhere at its own position.
	Hidden,
	/// `[?key]`: suppressed half of the time.
	Optional,
	/// `[one/two/three]`: uniform choice among inline terms.
	LiteralAlternation,
	/// `[key]`: override, category draw or article.
	Named,
}

/// A parsed bracket expression.
///
/// Borrows from the `[...]` text it was parsed from. The label (text
/// after `#`) only makes the tag textually distinct; it never takes
/// part in lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
	pub kind: TagKind,
	/// Lookup key, without kind marker and label.
	pub key: &'a str,
	pub label: Option<&'a str>,
	/// Tag body without its kind marker (key and label).
	body: &'a str,
}

impl<'a> Tag<'a> {
	/// Parses a `[...]` expression.
	///
	/// The kind is decided by the character following `[`; a plain tag
	/// whose key contains `/` is a literal alternation.
	///
	/// Only the leading `!` or `?` is a marker. Markers elsewhere stay in
	/// the key: `[!wow!]` hides `[wow!]`, not `[wow]`. Grammars written
	/// for engines that strip every `!`/`?` need the extra markers removed.
	///
	/// # Errors
	/// `BracketResolution` (nested brackets) if the body still contains `[`.
	pub fn parse(expression: &'a str) -> Result<Self> {
		let inner = expression
			.strip_prefix('[')
			.and_then(|rest| rest.strip_suffix(']'))
			.ok_or_else(|| Error::Internal(format!("tag '{expression}' is not bracketed")))?;

		if let Some(column) = inner.find(['[', ']']) {
			return Err(Error::resolution(ResolutionFailure::NestedBrackets { column }, expression));
		}

		let (kind, body) = if let Some(body) = inner.strip_prefix('!') {
			(TagKind::Hidden, body)
		} else if let Some(body) = inner.strip_prefix('?') {
			(TagKind::Optional, body)
		} else {
			(TagKind::Named, inner)
		};

		let (key, label) = match body.split_once('#') {
			Some((key, label)) => (key, Some(label)),
			None => (body, None),
		};

		let kind = if kind == TagKind::Named && key.contains('/') {
			TagKind::LiteralAlternation
		} else {
			kind
		};

		Ok(Self { kind, key, label, body })
	}

	/// The tag as it reads once its kind marker is dropped.
	///
	/// `[!animal#1]` → `[animal#1]`. This is what a hidden tag replaces
	/// elsewhere in the query.
	pub fn unmarked(&self) -> String {
		format!("[{}]", self.body)
	}
}
