/*!
This module defines the `Config` struct, which is used to configure a pipeline run with [`run`](../pipeline/fn.run.html). A config file is YAML unless its extension is `.json`.
*/

use anyhow::{Context, Result};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// The name of the column to predict. If it is `None`, the last column is the target.
	pub target_column: Option<String>,
	/// The seed handed to randomized learners.
	pub seed: u64,
	/// Delimited file columns with at most this many unique values are loaded as enums.
	pub enum_max_unique_values: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			target_column: None,
			seed: 1,
			enum_max_unique_values: 100,
		}
	}
}

impl Config {
	pub fn from_path(path: &Path) -> Result<Self> {
		let config = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read config file {}", path.display()))?;
		let is_json = path
			.extension()
			.map(|extension| extension.eq_ignore_ascii_case("json"))
			.unwrap_or(false);
		let config = if is_json {
			serde_json::from_str(&config)
				.with_context(|| format!("failed to parse config file {}", path.display()))?
		} else {
			serde_yaml::from_str(&config)
				.with_context(|| format!("failed to parse config file {}", path.display()))?
		};
		Ok(config)
	}

	/// Load the config file at `path` if there is one, or use the defaults.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::from_path(path),
			None => Ok(Self::default()),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_yaml() {
		let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
		writeln!(file, "target_column: play\nseed: 42").unwrap();
		let config = Config::from_path(file.path()).unwrap();
		assert_eq!(
			config,
			Config {
				target_column: Some("play".to_owned()),
				seed: 42,
				enum_max_unique_values: 100,
			}
		);
	}

	#[test]
	fn test_json() {
		let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
		writeln!(file, r#"{{"enum_max_unique_values": 10}}"#).unwrap();
		let config = Config::from_path(file.path()).unwrap();
		assert_eq!(config.enum_max_unique_values, 10);
		assert_eq!(config.seed, 1);
	}

	#[test]
	fn test_errors() {
		let error = Config::from_path(Path::new("/nonexistent/suinz.yaml")).unwrap_err();
		assert!(error.to_string().starts_with("failed to read config file"));
		let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
		writeln!(file, "sead: 3").unwrap();
		assert!(Config::from_path(file.path()).is_err());
		assert_eq!(Config::load(None).unwrap(), Config::default());
	}
}
