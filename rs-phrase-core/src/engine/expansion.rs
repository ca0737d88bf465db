use std::collections::HashMap;

use rand::Rng;

use crate::engine::config::DEFAULT_MAX_QUERY_LEN;
use crate::engine::options::{OptionRange, Tally};
use crate::engine::tag::{Tag, TagKind};
use crate::error::{Error, InputError, ResolutionFailure, Result};
use crate::grammar::store::Grammar;

/// Caller-supplied forced values, keyed by category name.
pub type Overrides = HashMap<String, String>;

// Placeholders for deferred `[a]`/`[an]` tags. Neither contains a bracket,
// so they survive the rewrite loop untouched.
const ARTICLE_OPEN: &str = "{{$AAN${{";
const ARTICLE_CLOSE: &str = "}}$AAN$}}";
const _: () = assert!(ARTICLE_OPEN.len() == ARTICLE_CLOSE.len());

/// One expansion of one query against a grammar.
///
/// Call-scoped: borrows the grammar, the random source and the optional
/// overrides for the duration of a single `run`.
pub(crate) struct Expansion<'a, R: Rng> {
	grammar: &'a Grammar,
	rng: &'a mut R,
	overrides: Option<&'a Overrides>,
	max_cycles: usize,
	max_query_len: usize,
	/// When set, suppressed optional tags are still resolved so their draws are counted.
	counting: bool,
	tally: Tally,
}

impl<'a, R: Rng> Expansion<'a, R> {
	pub(crate) fn new(grammar: &'a Grammar, rng: &'a mut R, max_cycles: usize) -> Self {
		Self {
			grammar,
			rng,
			overrides: None,
			max_cycles,
			max_query_len: DEFAULT_MAX_QUERY_LEN,
			counting: false,
			tally: Tally::new(),
		}
	}

	pub(crate) fn with_overrides(mut self, overrides: Option<&'a Overrides>) -> Self {
		self.overrides = overrides;
		self
	}

	pub(crate) fn with_max_query_len(mut self, max_query_len: usize) -> Self {
		self.max_query_len = max_query_len;
		self
	}

	/// Expands `query` and returns the option estimate instead of the phrase.
	pub(crate) fn count(mut self, query: &str) -> Result<OptionRange> {
		self.counting = true;
		self.run(query)?;
		Ok(self.tally.range())
	}

	/// Rewrites `query` until no tag remains.
	///
	/// # Behavior
	/// Each iteration takes the first `[` and the first `]` of the query,
	/// resolves that tag, then replaces **every** textual occurrence of it.
	/// This global replace is what makes `[animal] [animal]` agree and what
	/// lets `[!animal]` feed a later `[[animal]]`.
	///
	/// Once no `[` remains, deferred articles are resolved and the result
	/// is trimmed.
	///
	/// # Errors
	/// - `Input` for an unmatched `[` or a `]` before it
	/// - `Input` for an unchanged query on two consecutive iterations
	/// - `Input` when the iteration cap is reached or a rewrite would
	///   grow the query past the size cap
	/// - `BracketResolution` for nested brackets or an unknown key
	pub(crate) fn run(&mut self, query: &str) -> Result<String> {
		self.tally = Tally::new();

		let mut query = query.to_owned();
		let mut previous = String::new();
		let mut stalls = 0;
		let mut cycles = 0;

		while let Some(open) = query.find('[') {
			if query == previous {
				stalls += 1;
				if stalls == 2 {
					return Err(InputError::InfiniteLoop.into());
				}
			} else {
				stalls = 0;
			}
			previous.clone_from(&query);

			cycles += 1;
			if cycles >= self.max_cycles {
				return Err(InputError::InfiniteRecursion { limit: self.max_cycles }.into());
			}

			let close = match query.find(']') {
				Some(close) if close > open => close,
				Some(close) => return Err(InputError::StrayClosingBracket { column: close, query }.into()),
				None => return Err(InputError::UnmatchedBracket { column: open, query }.into()),
			};

			log::trace!("{query}");
			let found = query[open..=close].to_owned();
			let tag = Tag::parse(&found)?;
			self.tally.begin_tag();

			let (target, resolution) = match tag.kind {
				TagKind::Hidden => {
					query = query.replace(&found, "");
					(tag.unmarked(), self.resolve(&tag)?)
				}
				TagKind::Optional => {
					self.tally.add_suppressed_branch();
					let suppressed = self.rng.random_bool(0.5);
					let resolution = if !suppressed || self.counting {
						self.resolve(&tag)?
					} else {
						String::new()
					};
					(found.clone(), if suppressed { String::new() } else { resolution })
				}
				TagKind::LiteralAlternation | TagKind::Named => (found.clone(), self.resolve(&tag)?),
			};

			// Single pass: a run of three spaces only shrinks to two
			query = query.replace("  ", " ");

			// Global replace can double the query on every cycle
			let occurrences = query.matches(target.as_str()).count();
			let projected = (query.len() - occurrences * target.len())
				.saturating_add(occurrences.saturating_mul(resolution.len()));
			if projected > self.max_query_len {
				return Err(InputError::QueryTooLong { limit: self.max_query_len }.into());
			}

			log::trace!("Replace all '{target}' with '{resolution}'");
			query = query.replace(&target, &resolution);
		}

		let query = resolve_articles(query)?;
		Ok(query.trim().to_owned())
	}

	/// Resolves a tag key to text.
	///
	/// Lookup order: inline alternation, override, category, article.
	fn resolve(&mut self, tag: &Tag<'_>) -> Result<String> {
		let key = tag.key;

		if key.contains('/') {
			let terms: Vec<&str> = key.split('/').collect();
			return Ok(self.draw(&terms));
		}

		if let Some(value) = self.overrides.and_then(|overrides| overrides.get(key)) {
			return Ok(value.clone());
		}

		let grammar = self.grammar;
		if let Some(alternatives) = grammar.get(key) {
			return Ok(self.draw(alternatives));
		}

		if key == "a" || key == "an" {
			return Ok(format!("{ARTICLE_OPEN}{key}{ARTICLE_CLOSE}"));
		}

		Err(Error::resolution(ResolutionFailure::UnknownTerm, format!("[{key}]")))
	}

	/// Uniform draw among `terms`. An empty set yields an empty string
	/// and is not counted.
	fn draw<S: AsRef<str>>(&mut self, terms: &[S]) -> String {
		if terms.is_empty() {
			return String::new();
		}
		self.tally.record_draw(terms.len());
		let index = self.rng.random_range(0..terms.len());
		terms[index].as_ref().to_owned()
	}
}

/// Replaces every article placeholder with `a` or `an`, depending on the
/// first non-blank character that follows it.
///
/// # Errors
/// `Internal` if an open marker has no close marker after it.
fn resolve_articles(mut query: String) -> Result<String> {
	let len = ARTICLE_OPEN.len();

	while let Some(open) = query.find(ARTICLE_OPEN) {
		let close = match query.find(ARTICLE_CLOSE) {
			Some(close) if close > open => close,
			_ => return Err(Error::Internal("no matching article close marker for an open marker".to_owned())),
		};

		let after = &query[close + len..];
		let article = match after.trim_start().chars().next() {
			Some(c) if is_vowel(c) => "an",
			_ => "a",
		};

		query = format!("{}{}{}", &query[..open], article, after);
	}

	Ok(query)
}

fn is_vowel(c: char) -> bool {
	matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
