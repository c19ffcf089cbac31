use crate::engine::{DEFAULT_REPLACEMENT_CHAR, ErrorPolicy};
use crate::error::{Result, TppError};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration from a `.tpp.toml` file.
///
/// Every field except `root` is optional so that files further down the
/// cascade only override what they set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop walking up the directory tree after this file.
	#[serde(default)]
	pub root: bool,

	/// Descend into subdirectories when the target is a directory.
	pub recursive: Option<bool>,

	/// Regex matched against file names when enumerating a directory.
	pub file_filter: Option<String>,

	/// Whether a failing file aborts the batch.
	pub on_error: Option<ErrorPolicy>,

	/// Character substituted for invalid UTF-8 sequences.
	pub replacement_char: Option<char>,

	/// Print the parsed rules and log progress.
	pub verbose: Option<bool>,
}

impl Config {
	/// Check that `file-filter` compiles.
	pub fn validate(&self, path: &Path) -> Result<()> {
		if let Some(ref pattern) = self.file_filter {
			Regex::new(pattern).map_err(|source| TppError::InvalidConfigFilter {
				path: path.to_path_buf(),
				pattern: pattern.clone(),
				source,
			})?;
		}
		Ok(())
	}
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Effective settings after merging the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	pub recursive: bool,
	pub file_filter: Option<String>,
	pub on_error: ErrorPolicy,
	pub replacement_char: char,
	pub verbose: bool,

	/// Config files that contributed, most specific first.
	pub sources: Vec<PathBuf>,
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			recursive: false,
			file_filter: None,
			on_error: ErrorPolicy::default(),
			replacement_char: DEFAULT_REPLACEMENT_CHAR,
			verbose: false,
			sources: Vec::new(),
		}
	}
}
