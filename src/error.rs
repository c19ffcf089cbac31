use std::path::PathBuf;

/// Library-level structured errors for tpp.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum TppError {
	#[error("Failed to read rule file: {path}")]
	RuleFileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid regex in rule file at line {line}: {pattern}")]
	InvalidRegex {
		line: usize,
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid target file pattern: {pattern}")]
	InvalidFilePattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Failed to read config file: {path}")]
	ConfigRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid file-filter in config file {path}: {pattern}")]
	InvalidConfigFilter {
		path: PathBuf,
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Failed to read directory: {path}")]
	ReadDir {
		path: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("Failed to create directory: {path}")]
	CreateDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write file: {path}")]
	WriteFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using TppError.
pub type Result<T> = std::result::Result<T, TppError>;
