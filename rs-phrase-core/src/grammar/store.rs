use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// In-memory grammar: category name → ordered alternatives.
///
/// # Invariants
/// - No two categories share a name
/// - Alternatives keep the order they were loaded in
///
/// Categories are kept sorted by name so that iteration (and therefore
/// seeded validation) is reproducible.
#[derive(Serialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
	categories: BTreeMap<String, Vec<String>>,
}

impl Grammar {
	/// Returns an empty grammar.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a category.
	///
	/// The name is trimmed before insertion.
	///
	/// # Errors
	/// Returns a `GrammarLoading` error, attributed to `origin`, if the name
	/// is empty or already present.
	pub fn insert(&mut self, name: &str, alternatives: Vec<String>, origin: Option<&str>) -> Result<()> {
		let name = name.trim();
		if name.is_empty() {
			return Err(Error::loading_in("category declared without a name", origin));
		}
		if self.categories.contains_key(name) {
			return Err(Error::loading_in(format!("category '{name}' is already defined"), origin));
		}
		log::debug!("Set category {name} ({} alternatives)", alternatives.len());
		self.categories.insert(name.to_owned(), alternatives);
		Ok(())
	}

	/// Returns the alternatives of a category, if it exists.
	pub fn get(&self, name: &str) -> Option<&[String]> {
		self.categories.get(name).map(Vec::as_slice)
	}

	/// Returns `true` if a category with this name exists.
	pub fn contains(&self, name: &str) -> bool {
		self.categories.contains_key(name)
	}

	/// Number of categories.
	pub fn len(&self) -> usize {
		self.categories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}

	/// Category names, in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.categories.keys().map(String::as_str)
	}

	/// Iterates over `(name, alternatives)` pairs, in sorted name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.categories.iter().map(|(name, alternatives)| (name.as_str(), alternatives.as_slice()))
	}
}
