use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, Settings};
use crate::error::{Result, TppError};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in each directory.
pub const CONFIG_FILE_NAME: &str = ".tpp.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.tpp.toml`
/// 2. If found and `root = true`, stop walking up
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.tpp.toml
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let user_config = match user_config_path() {
		Ok(path) => Some(path),
		Err(TppError::HomeDirectoryNotFound) => None,
		Err(e) => return Err(e),
	};
	discover_configs_with_user(start_dir, user_config.as_deref())
}

/// Same as [`discover_configs`] with an explicit user config location.
pub fn discover_configs_with_user(
	start_dir: &Path,
	user_config: Option<&Path>,
) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = Some(start_dir);

	while let Some(dir) = current_dir {
		let config_path = dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			let config = parse_config_file(&config_path)?;
			let root = config.root;
			configs.push(LoadedConfig {
				config,
				path: config_path,
			});
			if root {
				break;
			}
		}

		current_dir = dir.parent();
	}

	if let Some(user_path) = user_config
		&& user_path.is_file()
		&& !configs.iter().any(|loaded| loaded.path == user_path)
	{
		configs.push(LoadedConfig {
			config: parse_config_file(user_path)?,
			path: user_path.to_path_buf(),
		});
	}

	Ok(configs)
}

/// Merge configs into effective settings.
///
/// For each field, the first config in cascade order that sets it wins.
pub fn merge_configs(configs: &[LoadedConfig]) -> Settings {
	let defaults = Settings::default();

	Settings {
		recursive: configs
			.iter()
			.find_map(|c| c.config.recursive)
			.unwrap_or(defaults.recursive),
		file_filter: configs.iter().find_map(|c| c.config.file_filter.clone()),
		on_error: configs
			.iter()
			.find_map(|c| c.config.on_error)
			.unwrap_or(defaults.on_error),
		replacement_char: configs
			.iter()
			.find_map(|c| c.config.replacement_char)
			.unwrap_or(defaults.replacement_char),
		verbose: configs
			.iter()
			.find_map(|c| c.config.verbose)
			.unwrap_or(defaults.verbose),
		sources: configs.iter().map(|c| c.path.clone()).collect(),
	}
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_settings(start_dir: &Path) -> Result<Settings> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(TppError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}
