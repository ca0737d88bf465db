use serde::Serialize;

/// Estimated number of distinct outputs of a query.
///
/// This is an approximation, not an enumeration: alternatives that
/// contain further tags are not expanded for counting, so grammars that
/// mix static and dynamic fragments can produce more outputs than
/// `upper_bound` reports.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionRange {
	pub lower_bound: u64,
	pub upper_bound: u64,
}

/// Running count for one expansion.
///
/// # Behavior
/// - Both bounds start at 1
/// - Each tag occurrence starts a fresh branch count
/// - An optional tag adds one virtual branch (the suppressed one)
/// - Each random draw adds its number of terms to the branch count,
///   bumps the lower bound by one and multiplies the upper bound by
///   the branch count
#[derive(Debug, Clone)]
pub(crate) struct Tally {
	lower_bound: u64,
	upper_bound: u64,
	branches: u64,
}

impl Tally {
	pub(crate) fn new() -> Self {
		Self { lower_bound: 1, upper_bound: 1, branches: 0 }
	}

	/// Starts counting a new tag occurrence.
	pub(crate) fn begin_tag(&mut self) {
		self.branches = 0;
	}

	/// Accounts for the "rendered nothing" branch of an optional tag.
	pub(crate) fn add_suppressed_branch(&mut self) {
		self.branches += 1;
	}

	/// Accounts for a random draw among `terms` alternatives.
	pub(crate) fn record_draw(&mut self, terms: usize) {
		self.branches = self.branches.saturating_add(terms as u64);
		self.lower_bound = self.lower_bound.saturating_add(1);
		self.upper_bound = self.upper_bound.saturating_mul(self.branches);
	}

	pub(crate) fn range(&self) -> OptionRange {
		OptionRange { lower_bound: self.lower_bound, upper_bound: self.upper_bound }
	}
}
