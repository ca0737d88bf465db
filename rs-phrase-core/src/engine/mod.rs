//! Top-level module for phrase expansion.
//!
//! This module provides:
//! - The high-level engine (`PhraseEngine`)
//! - Engine configuration (`EngineConfig`)
//! - Bracket tag classification (`Tag`, `TagKind`)
//! - The rewrite loop that expands a query (internal)
//! - Option counting (`OptionRange`)
//! - Grammar validation (`Finding`)

/// High-level interface owning a grammar, a configuration and a random source.
///
/// Exposes loading, expansion, option counting and validation.
pub mod phrase_engine;

/// Engine configuration (iteration cap, seed, validation on load).
pub mod config;

/// Bracket tag parsing and classification.
pub mod tag;

/// The tag rewrite loop and deferred article resolution.
///
/// Only `Overrides` is public; the loop itself is driven by `PhraseEngine`.
pub mod expansion;

/// Lower/upper bound estimate of the number of possible outputs.
pub mod options;

/// Dry-run validation of every category fragment.
pub mod validator;
