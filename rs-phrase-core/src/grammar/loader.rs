use std::path::Path;

use crate::error::{Error, Result};
use crate::grammar::store::Grammar;
use crate::io::{read_file, read_manifest};

/// Name of the index file expected at the root of a grammar directory.
pub const GRAMMAR_MANIFEST: &str = "index.grammar";

/// Source label used for categories loaded from a pre-built mapping.
pub const DIRECT_GRAMMAR: &str = "direct grammar";

/// Loads every grammar file listed in `root/index.grammar`, in listed order.
///
/// # Errors
/// - `GrammarLoading` if the manifest is missing or unreadable
/// - `GrammarLoading` if a listed file is missing or unreadable
/// - `GrammarLoading` if any file declares an already known category
pub fn load_manifest<P: AsRef<Path>>(grammar: &mut Grammar, root: P) -> Result<()> {
	let root = root.as_ref();
	let manifest = root.join(GRAMMAR_MANIFEST);
	if !manifest.is_file() {
		return Err(Error::loading(format!(
			"grammar manifest {GRAMMAR_MANIFEST} not found at {}",
			manifest.display()
		)));
	}

	let entries = read_manifest(&manifest)
		.map_err(|e| Error::loading(format!("failed to read {}: {e}", manifest.display())))?;

	for entry in entries {
		let path = root.join(&entry);
		if !path.is_file() {
			return Err(Error::loading_in(
				format!("can't find linked grammar file {}", path.display()),
				Some(GRAMMAR_MANIFEST),
			));
		}
		load_file(grammar, &path, &entry)?;
	}

	Ok(())
}

/// Loads a single grammar file, labelling its categories with `label`.
fn load_file(grammar: &mut Grammar, path: &Path, label: &str) -> Result<()> {
	log::debug!("Loading {}", path.display());
	let lines = read_file(path)
		.map_err(|e| Error::loading_in(format!("failed to read {}: {e}", path.display()), Some(label)))?;
	load_lines(grammar, &lines, Some(label))?;
	log::debug!("Done loading {label}");
	Ok(())
}

/// Loads a grammar text blob. See [`load_lines`].
pub fn load_text(grammar: &mut Grammar, text: &str, origin: Option<&str>) -> Result<()> {
	load_lines(grammar, text.lines(), origin)
}

/// Compiles grammar lines into categories.
///
/// # Format
/// - Blank lines and lines whose first non-blank character is `#` are ignored
/// - A line starting with `*` declares a category named by the rest of the line
/// - Any other line is trimmed and appended to the current category;
///   one leading `\` is stripped, so `\#` escapes a comment marker
///
/// Content lines that appear before the first declaration belong to no
/// category and are skipped.
///
/// # Errors
/// `GrammarLoading` on a duplicate or empty category name. Categories
/// committed before the failure stay in `grammar`.
pub fn load_lines<I, S>(grammar: &mut Grammar, lines: I, origin: Option<&str>) -> Result<()>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut current: Option<(String, Vec<String>)> = None;

	for line in lines {
		let line = line.as_ref();
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}

		if let Some(name) = line.strip_prefix('*') {
			if let Some((name, alternatives)) = current.take() {
				grammar.insert(&name, alternatives, origin)?;
			}
			current = Some((name.to_owned(), Vec::new()));
			continue;
		}

		let fragment = trimmed.strip_prefix('\\').unwrap_or(trimmed);
		match current.as_mut() {
			Some((_, alternatives)) => alternatives.push(fragment.to_owned()),
			None => log::warn!(
				"Ignoring '{fragment}' in {}: no category declared yet",
				origin.unwrap_or("grammar text")
			),
		}
	}

	if let Some((name, alternatives)) = current {
		grammar.insert(&name, alternatives, origin)?;
	}

	Ok(())
}

/// Commits every entry of a pre-built mapping as a category.
///
/// # Errors
/// `GrammarLoading` on a duplicate or empty category name.
pub fn load_mapping<I>(grammar: &mut Grammar, mapping: I) -> Result<()>
where
	I: IntoIterator<Item = (String, Vec<String>)>,
{
	for (name, alternatives) in mapping {
		grammar.insert(&name, alternatives, Some(DIRECT_GRAMMAR))?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn create_grammar_file(dir: &Path, name: &str, content: &str) {
		std::fs::write(dir.join(name), content).unwrap();
	}

	#[test]
	fn loads_categories_and_skips_comments() {
		let mut grammar = Grammar::new();
		let text = "
# animals
* animal
  cat
dog

   # a comment with leading spaces
* colour
red
";
		load_text(&mut grammar, text, None).unwrap();

		assert_eq!(grammar.len(), 2);
		assert_eq!(grammar.get("animal").unwrap(), ["cat", "dog"]);
		assert_eq!(grammar.get("colour").unwrap(), ["red"]);
	}

	#[test]
	fn escaped_hash_is_content() {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, "*tag\n\\#hashtag\n  \\#trending  ", None).unwrap();
		assert_eq!(grammar.get("tag").unwrap(), ["#hashtag", "#trending"]);
	}

	#[test]
	fn category_name_is_trimmed() {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, "*   thing to buy  \ncpu fan", None).unwrap();
		assert_eq!(grammar.get("thing to buy").unwrap(), ["cpu fan"]);
	}

	#[test]
	fn category_without_alternatives_is_kept() {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, "*something\n*other\nx", None).unwrap();
		assert!(grammar.get("something").unwrap().is_empty());
	}

	#[test]
	fn lines_before_any_category_are_skipped() {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, "orphan\n*animal\ncat", None).unwrap();
		assert_eq!(grammar.len(), 1);
		assert_eq!(grammar.get("animal").unwrap(), ["cat"]);
	}

	#[test]
	fn duplicate_category_fails_even_when_separated() {
		let mut grammar = Grammar::new();
		let text = "*letter\na\n*digit\n1\n*letter\nb";
		let error = load_text(&mut grammar, text, Some("letters.grammar")).unwrap_err();

		match error {
			Error::GrammarLoading { message, origin } => {
				assert!(message.contains("letter"));
				assert_eq!(origin.as_deref(), Some("letters.grammar"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn duplicate_across_sources_fails() {
		let mut grammar = Grammar::new();
		load_text(&mut grammar, "*letter\na", Some("one")).unwrap();
		assert!(load_text(&mut grammar, "*letter\nb", Some("two")).is_err());
	}

	#[test]
	fn mapping_enforces_uniqueness() {
		let mut grammar = Grammar::new();
		load_mapping(&mut grammar, vec![("animal".to_owned(), vec!["cat".to_owned()])]).unwrap();
		let error = load_mapping(&mut grammar, vec![("animal".to_owned(), Vec::new())]).unwrap_err();
		assert!(matches!(error, Error::GrammarLoading { origin: Some(ref o), .. } if o == DIRECT_GRAMMAR));
	}

	#[test]
	fn manifest_loads_files_in_order() {
		let temp = TempDir::new().unwrap();
		create_grammar_file(temp.path(), GRAMMAR_MANIFEST, "animals.grammar\n\ncolours.grammar\n");
		create_grammar_file(temp.path(), "animals.grammar", "*animal\ncat\ndog\n");
		create_grammar_file(temp.path(), "colours.grammar", "*colour\nred\nblue\n");

		let mut grammar = Grammar::new();
		load_manifest(&mut grammar, temp.path()).unwrap();

		assert_eq!(grammar.len(), 2);
		assert_eq!(grammar.get("colour").unwrap(), ["red", "blue"]);
	}

	#[test]
	fn manifest_missing_index_fails() {
		let temp = TempDir::new().unwrap();
		let mut grammar = Grammar::new();
		let error = load_manifest(&mut grammar, temp.path()).unwrap_err();
		assert!(error.to_string().contains(GRAMMAR_MANIFEST));
	}

	#[test]
	fn manifest_missing_listed_file_fails() {
		let temp = TempDir::new().unwrap();
		create_grammar_file(temp.path(), GRAMMAR_MANIFEST, "ghost.grammar\n");

		let mut grammar = Grammar::new();
		let error = load_manifest(&mut grammar, temp.path()).unwrap_err();
		assert!(error.to_string().contains("ghost.grammar"));
	}

	#[test]
	fn manifest_duplicate_names_the_file() {
		let temp = TempDir::new().unwrap();
		create_grammar_file(temp.path(), GRAMMAR_MANIFEST, "a.grammar\nb.grammar\n");
		create_grammar_file(temp.path(), "a.grammar", "*letter\nx\n");
		create_grammar_file(temp.path(), "b.grammar", "*letter\ny\n");

		let mut grammar = Grammar::new();
		let error = load_manifest(&mut grammar, temp.path()).unwrap_err();
		assert!(matches!(error, Error::GrammarLoading { origin: Some(ref o), .. } if o == "b.grammar"));
	}
}
