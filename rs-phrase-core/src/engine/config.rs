/// Default cap on rewrite iterations for one query.
pub const DEFAULT_MAX_PARSE_CYCLES: usize = 1024;

/// Default cap, in bytes, on the size of a query during expansion.
pub const DEFAULT_MAX_QUERY_LEN: usize = 1 << 20;

/// Engine configuration.
///
/// # Responsibilities
/// - Bound the number of rewrite iterations per query (`max_parse_cycles`)
/// - Bound the size a query may grow to while it is rewritten (`max_query_len`)
/// - Select a deterministic random source (`seed`) or OS entropy
/// - Optionally validate the grammar after every load (`validate_on_load`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
	/// Iteration cap; reaching it fails the query with an infinite recursion error.
	max_parse_cycles: usize,

	/// Size cap in bytes; a rewrite that would exceed it fails the query.
	max_query_len: usize,

	/// Seed of the engine's random source. `None` seeds from the OS.
	pub seed: Option<u64>,

	/// Run the validator after each load and fail the load on findings.
	pub validate_on_load: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			max_parse_cycles: DEFAULT_MAX_PARSE_CYCLES,
			max_query_len: DEFAULT_MAX_QUERY_LEN,
			seed: None,
			validate_on_load: false,
		}
	}
}

impl EngineConfig {
	/// Returns the iteration cap.
	pub fn max_parse_cycles(&self) -> usize {
		self.max_parse_cycles
	}

	/// Sets the iteration cap.
	///
	/// # Errors
	/// Returns an error if `max_parse_cycles` is zero.
	pub fn set_max_parse_cycles(&mut self, max_parse_cycles: usize) -> Result<(), String> {
		if max_parse_cycles == 0 {
			return Err("max_parse_cycles must be at least 1".to_owned());
		}
		self.max_parse_cycles = max_parse_cycles;
		Ok(())
	}

	/// Returns the query size cap, in bytes.
	pub fn max_query_len(&self) -> usize {
		self.max_query_len
	}

	/// Sets the query size cap, in bytes.
	///
	/// # Errors
	/// Returns an error if `max_query_len` is zero.
	pub fn set_max_query_len(&mut self, max_query_len: usize) -> Result<(), String> {
		if max_query_len == 0 {
			return Err("max_query_len must be at least 1".to_owned());
		}
		self.max_query_len = max_query_len;
		Ok(())
	}
}
