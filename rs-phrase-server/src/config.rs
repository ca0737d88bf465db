use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use rs_phrase_core::EngineConfig;
use rs_phrase_core::io::normalize_folder;

/// Server settings, read from the environment.
///
/// | Variable               | Default          |
/// |------------------------|------------------|
/// | `RS_PHRASE_ROOT`       | `./data`         |
/// | `RS_PHRASE_BIND`       | `127.0.0.1:5000` |
/// | `RS_PHRASE_WORKERS`    | number of CPUs   |
/// | `RS_PHRASE_SEED`       | none (OS seeded) |
/// | `RS_PHRASE_MAX_CYCLES` | engine default   |
/// | `RS_PHRASE_MAX_LEN`    | engine default   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub root: PathBuf,
	pub bind: String,
	pub workers: usize,
	pub engine: EngineConfig,
}

impl ServerConfig {
	/// Builds the configuration from the process environment.
	pub fn from_env() -> Result<Self, String> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the configuration from any key lookup (used by tests).
	pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
	where
		F: Fn(&str) -> Option<String>,
	{
		let root = normalize_folder(&lookup("RS_PHRASE_ROOT").unwrap_or_else(|| "./data".to_owned()));
		let bind = lookup("RS_PHRASE_BIND").unwrap_or_else(|| "127.0.0.1:5000".to_owned());
		let workers = parse_var(&lookup, "RS_PHRASE_WORKERS")?.unwrap_or_else(num_cpus::get);
		if workers == 0 {
			return Err("RS_PHRASE_WORKERS must be at least 1".to_owned());
		}

		let mut engine = EngineConfig::default();
		engine.seed = parse_var(&lookup, "RS_PHRASE_SEED")?;
		if let Some(max_cycles) = parse_var(&lookup, "RS_PHRASE_MAX_CYCLES")? {
			engine.set_max_parse_cycles(max_cycles)?;
		}
		if let Some(max_len) = parse_var(&lookup, "RS_PHRASE_MAX_LEN")? {
			engine.set_max_query_len(max_len)?;
		}

		Ok(Self { root, bind, workers, engine })
	}
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	match lookup(key) {
		None => Ok(None),
		Some(raw) => raw
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| format!("{key} has an invalid value: '{raw}'")),
	}
}
