//! Error types for grammar loading and phrase expansion.
//!
//! Every failure the engine can report falls in one of four kinds:
//! - `GrammarLoading`: missing manifest/file, duplicate or empty category name
//! - `Input`: malformed or non-terminating query
//! - `BracketResolution`: a tag that cannot be resolved
//! - `Internal`: an invariant of the engine itself was broken
//!
//! All of them are recoverable by the caller.

use std::fmt;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type of the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
	/// Raised while building a grammar.
	#[error("grammar loading error{}: {message}", origin_suffix(.origin))]
	GrammarLoading {
		/// What went wrong.
		message: String,
		/// Label of the grammar source (file name, "direct grammar", ...), when known.
		origin: Option<String>,
	},

	/// Raised while expanding a query that is malformed or never terminates.
	#[error("input error: {0}")]
	Input(InputError),

	/// Raised while expanding a tag that cannot be resolved.
	#[error("{failure}: \"{expression}\"")]
	BracketResolution {
		/// Why the tag could not be resolved.
		failure: ResolutionFailure,
		/// The offending tag or key.
		expression: String,
	},

	/// An engine invariant was violated. Should not happen.
	#[error("internal error: {0}")]
	Internal(String),
}

fn origin_suffix(origin: &Option<String>) -> String {
	match origin {
		Some(origin) => format!(" [in {origin}]"),
		None => String::new(),
	}
}

impl Error {
	/// Creates a grammar loading error without a source label.
	pub fn loading(message: impl Into<String>) -> Self {
		Self::GrammarLoading { message: message.into(), origin: None }
	}

	/// Creates a grammar loading error attributed to `origin`.
	pub fn loading_in(message: impl Into<String>, origin: Option<&str>) -> Self {
		Self::GrammarLoading {
			message: message.into(),
			origin: origin.map(str::to_owned),
		}
	}

	/// Creates a bracket resolution error.
	pub fn resolution(failure: ResolutionFailure, expression: impl Into<String>) -> Self {
		Self::BracketResolution { failure, expression: expression.into() }
	}
}

impl From<InputError> for Error {
	fn from(error: InputError) -> Self {
		Self::Input(error)
	}
}

/// Reasons a query is rejected as input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
	/// A `[` without a closing `]` after it.
	UnmatchedBracket {
		/// Byte offset of the opening bracket.
		column: usize,
		/// The query as it was when the problem was found.
		query: String,
	},
	/// A `]` before the first `[`.
	StrayClosingBracket {
		/// Byte offset of the closing bracket.
		column: usize,
		/// The query as it was when the problem was found.
		query: String,
	},
	/// The query stopped changing between iterations.
	InfiniteLoop,
	/// The iteration cap was reached.
	InfiniteRecursion {
		/// The configured cap.
		limit: usize,
	},
	/// A rewrite would have grown the query past the size cap.
	QueryTooLong {
		/// The configured cap, in bytes.
		limit: usize,
	},
}

impl fmt::Display for InputError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnmatchedBracket { column, query } => {
				write!(f, "no closing bracket for the opening bracket at col.{column} in '{query}'")
			}
			Self::StrayClosingBracket { column, query } => {
				write!(f, "stray ']' before the opening bracket at col.{column} in '{query}'")
			}
			Self::InfiniteLoop => write!(f, "found an infinite loop and quit"),
			Self::InfiniteRecursion { limit } => {
				write!(f, "found infinite recursion and quit after {limit} cycles")
			}
			Self::QueryTooLong { limit } => {
				write!(f, "query grew past {limit} bytes and quit")
			}
		}
	}
}

/// Reasons a single tag cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
	/// The tag still contains a bracket (direct nesting without an early call).
	NestedBrackets {
		/// Byte offset of the nested bracket inside the tag body.
		column: usize,
	},
	/// The key is neither a literal alternation, an override, a category nor an article.
	UnknownTerm,
}

impl fmt::Display for ResolutionFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NestedBrackets { column } => write!(f, "nested brackets at col.{column}"),
			Self::UnknownTerm => write!(f, "unknown term, can't resolve"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loading_error_mentions_origin() {
		let error = Error::loading_in("category 'letter' already exists", Some("letters.grammar"));
		assert_eq!(
			error.to_string(),
			"grammar loading error [in letters.grammar]: category 'letter' already exists"
		);
	}

	#[test]
	fn loading_error_without_origin() {
		let error = Error::loading("manifest not found");
		assert_eq!(error.to_string(), "grammar loading error: manifest not found");
	}

	#[test]
	fn resolution_error_carries_expression() {
		let error = Error::resolution(ResolutionFailure::UnknownTerm, "[pony]");
		assert_eq!(error.to_string(), "unknown term, can't resolve: \"[pony]\"");
	}

	#[test]
	fn input_error_converts() {
		let error: Error = InputError::InfiniteLoop.into();
		assert!(matches!(error, Error::Input(InputError::InfiniteLoop)));
	}

	#[test]
	fn stray_closing_bracket_names_the_bracket() {
		let error = InputError::StrayClosingBracket { column: 7, query: "smile :] [animal]".into() };
		assert_eq!(error.to_string(), "stray ']' before the opening bracket at col.7 in 'smile :] [animal]'");
	}
}
