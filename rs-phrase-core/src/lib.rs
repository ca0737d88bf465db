//! Grammar-driven phrase generation library.
//!
//! This crate expands queries such as `"[a] [colour] [animal]"` against
//! an author-supplied grammar, including:
//! - A line-oriented grammar format, loaded from text, mappings or a
//!   manifest directory
//! - A tag rewrite engine (hidden/early calls, optional tags, literal
//!   alternation, labels, deferred `a`/`an`)
//! - An approximate option counter and a grammar validator
//!
//! The usual entry point is [`PhraseEngine`].

/// Phrase expansion, option counting and validation.
pub mod engine;

/// Grammar store and loaders.
pub mod grammar;

/// Error types shared by every module.
pub mod error;

/// I/O utilities (file and manifest reading, path helpers).
pub mod io;

pub use engine::config::EngineConfig;
pub use engine::expansion::Overrides;
pub use engine::options::OptionRange;
pub use engine::phrase_engine::PhraseEngine;
pub use engine::validator::Finding;
pub use error::{Error, Result};
pub use grammar::store::Grammar;
