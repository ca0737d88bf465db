//! Grammar storage and loading.
//!
//! A grammar maps category names to ordered lists of alternative
//! phrase fragments. This module provides:
//! - The in-memory store (`Grammar`)
//! - Loaders for the line-oriented text format, manifest directories
//!   and pre-built mappings

/// In-memory category table.
///
/// Insert-once semantics: a duplicate name is a loading error,
/// never an overwrite or a merge.
pub mod store;

/// Text, manifest and mapping loaders.
///
/// Compiles grammar sources into `Grammar` entries, handling comments,
/// escapes and category declarations.
pub mod loader;
