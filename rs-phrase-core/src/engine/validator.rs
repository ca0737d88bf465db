use std::fmt;

use rand::Rng;

use crate::engine::config::EngineConfig;
use crate::engine::expansion::Expansion;
use crate::error::Error;
use crate::grammar::store::Grammar;

/// A problem found while validating a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
	/// The category name contains a path separator.
	NamingWarning { category: String },
	/// Expanding one alternative of a category failed.
	Failure {
		category: String,
		fragment: String,
		error: Error,
	},
}

impl Finding {
	/// Name of the category the finding is about.
	pub fn category(&self) -> &str {
		match self {
			Self::NamingWarning { category } | Self::Failure { category, .. } => category,
		}
	}
}

impl fmt::Display for Finding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NamingWarning { category } => write!(
				f,
				"warning: category '{category}' contains slashes, consider renaming or deleting it"
			),
			Self::Failure { category, fragment, error } => {
				write!(f, "{category} -> '{fragment}': {error}")
			}
		}
	}
}

/// Dry-runs every alternative of every category as a top-level query.
///
/// Errors are collected, never propagated. Expansion is random, so an
/// error branch with a low probability may not show up in a single pass.
pub(crate) fn validate<R: Rng>(grammar: &Grammar, rng: &mut R, config: &EngineConfig) -> Vec<Finding> {
	let mut findings = Vec::new();

	for (category, alternatives) in grammar.iter() {
		if category.contains(['/', '\\']) {
			log::warn!("Category '{category}' contains slashes");
			findings.push(Finding::NamingWarning { category: category.to_owned() });
		}

		for fragment in alternatives {
			let mut expansion =
				Expansion::new(grammar, rng, config.max_parse_cycles()).with_max_query_len(config.max_query_len());
			if let Err(error) = expansion.run(fragment) {
				findings.push(Finding::Failure {
					category: category.to_owned(),
					fragment: fragment.clone(),
					error,
				});
			}
		}
	}

	findings
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use crate::error::{InputError, ResolutionFailure};
	use crate::grammar::loader::load_text;

	fn check(text: &str) -> Vec<Finding> {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, text, None).unwrap();
		let mut rng = StdRng::seed_from_u64(42);
		validate(&grammar, &mut rng, &EngineConfig::default())
	}

	#[test]
	fn consistent_grammar_has_no_findings() {
		let findings = check("*phrase\nthe [colour] [animal]\n*animal\ncat\ndog\n*colour\nred\n");
		assert!(findings.is_empty(), "{findings:?}");
	}

	#[test]
	fn unknown_reference_is_reported() {
		let findings = check("*phrase\nthe [colour] [unicorn]\nplain\n*colour\nred\n");
		assert_eq!(
			findings,
			vec![Finding::Failure {
				category: "phrase".into(),
				fragment: "the [colour] [unicorn]".into(),
				error: Error::resolution(ResolutionFailure::UnknownTerm, "[unicorn]"),
			}]
		);
	}

	#[test]
	fn all_failures_are_collected() {
		let findings = check("*a\n[[b]]\n*b\n[b]\n*c\nunclosed [b\n");
		assert_eq!(findings.len(), 3);
		assert!(matches!(&findings[0], Finding::Failure { error: Error::BracketResolution { .. }, .. }));
		assert!(matches!(&findings[1], Finding::Failure { error: Error::Input(InputError::InfiniteLoop), .. }));
		assert!(matches!(
			&findings[2],
			Finding::Failure { error: Error::Input(InputError::UnmatchedBracket { .. }), .. }
		));
	}

	#[test]
	fn slashes_in_names_are_flagged() {
		let findings = check("*either/or\nx\n*back\\slash\ny\n");
		assert_eq!(findings.len(), 2);
		assert!(findings.iter().all(|f| matches!(f, Finding::NamingWarning { .. })));
		assert_eq!(findings[0].category(), "back\\slash");
		assert!(findings[1].to_string().contains("either/or"));
	}
}
