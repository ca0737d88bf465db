use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::engine::config::EngineConfig;
use crate::engine::expansion::{Expansion, Overrides};
use crate::engine::options::OptionRange;
use crate::engine::validator::{self, Finding};
use crate::error::{Error, Result};
use crate::grammar::loader;
use crate::grammar::store::Grammar;

/// High-level phrase generator.
///
/// # Responsibilities
/// - Own one grammar generation, its configuration and its random source
/// - Load grammar sources (manifest directory, text, mapping)
/// - Expand queries, estimate option counts and validate the grammar
///
/// Reloading means building a new engine and swapping it in; a loaded
/// grammar is never edited in place.
#[derive(Debug)]
pub struct PhraseEngine {
	grammar: Grammar,
	config: EngineConfig,
	rng: StdRng,
}

impl Default for PhraseEngine {
	fn default() -> Self {
		Self::new()
	}
}

impl PhraseEngine {
	/// Creates an engine with an empty grammar, seeded from the OS.
	pub fn new() -> Self {
		Self::with_config(EngineConfig::default())
	}

	/// Creates an engine with an empty grammar and a deterministic random source.
	pub fn with_seed(seed: u64) -> Self {
		let mut config = EngineConfig::default();
		config.seed = Some(seed);
		Self::with_config(config)
	}

	/// Creates an engine with an empty grammar and the given configuration.
	pub fn with_config(config: EngineConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Self { grammar: Grammar::new(), config, rng }
	}

	/// Creates an engine and loads the grammar directory at `root`.
	///
	/// # Errors
	/// See [`PhraseEngine::load_manifest`].
	pub fn from_manifest<P: AsRef<Path>>(root: P, config: EngineConfig) -> Result<Self> {
		let mut engine = Self::with_config(config);
		engine.load_manifest(root)?;
		Ok(engine)
	}

	/// Returns the loaded grammar.
	pub fn grammar(&self) -> &Grammar {
		&self.grammar
	}

	/// Returns the engine configuration.
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Loads every file listed in `root/index.grammar`.
	///
	/// # Errors
	/// - `GrammarLoading` if the manifest or a listed file is missing
	/// - `GrammarLoading` if a category is declared twice
	/// - `GrammarLoading` if `validate_on_load` is set and validation finds problems
	pub fn load_manifest<P: AsRef<Path>>(&mut self, root: P) -> Result<()> {
		loader::load_manifest(&mut self.grammar, root)?;
		self.validate_after_load()
	}

	/// Loads a grammar text blob, labelling errors with `origin`.
	pub fn load_text(&mut self, text: &str, origin: Option<&str>) -> Result<()> {
		loader::load_text(&mut self.grammar, text, origin)?;
		self.validate_after_load()
	}

	/// Loads grammar lines, labelling errors with `origin`.
	pub fn load_lines<I, S>(&mut self, lines: I, origin: Option<&str>) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		loader::load_lines(&mut self.grammar, lines, origin)?;
		self.validate_after_load()
	}

	/// Loads a pre-built `(name, alternatives)` mapping.
	pub fn load_mapping<I>(&mut self, mapping: I) -> Result<()>
	where
		I: IntoIterator<Item = (String, Vec<String>)>,
	{
		loader::load_mapping(&mut self.grammar, mapping)?;
		self.validate_after_load()
	}

	fn validate_after_load(&mut self) -> Result<()> {
		if !self.config.validate_on_load {
			return Ok(());
		}
		let findings = self.validate();
		match findings.first() {
			None => Ok(()),
			Some(first) => Err(Error::loading(format!(
				"validation found {} problem(s), first: {first}",
				findings.len()
			))),
		}
	}

	/// Expands `query` into a phrase.
	///
	/// # Errors
	/// - `Input` for malformed or non-terminating queries
	/// - `BracketResolution` for unresolvable tags
	pub fn parse(&mut self, query: &str) -> Result<String> {
		self.expansion(None).run(query)
	}

	/// Expands `query`, using `overrides` in place of category draws.
	pub fn parse_with(&mut self, query: &str, overrides: &Overrides) -> Result<String> {
		self.expansion(Some(overrides)).run(query)
	}

	/// Estimates how many distinct phrases `query` can produce.
	///
	/// Expands the query once (discarding the phrase) and reports the
	/// lower/upper bound accumulated over its draws.
	pub fn count_options(&mut self, query: &str) -> Result<OptionRange> {
		self.expansion(None).count(query)
	}

	/// Same as [`PhraseEngine::count_options`], with overrides.
	pub fn count_options_with(&mut self, query: &str, overrides: &Overrides) -> Result<OptionRange> {
		self.expansion(Some(overrides)).count(query)
	}

	/// Expands every alternative of every category and collects the failures.
	///
	/// An empty list means no problem was hit in this (random) pass.
	pub fn validate(&mut self) -> Vec<Finding> {
		validator::validate(&self.grammar, &mut self.rng, &self.config)
	}

	fn expansion<'a>(&'a mut self, overrides: Option<&'a Overrides>) -> Expansion<'a, StdRng> {
		Expansion::new(&self.grammar, &mut self.rng, self.config.max_parse_cycles())
			.with_max_query_len(self.config.max_query_len())
			.with_overrides(overrides)
	}
}
