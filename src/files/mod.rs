//! Filesystem helpers for tpp.
//!
//! This module handles:
//! - Reading text files with invalid UTF-8 repaired
//! - Writing processed text line by line
//! - Creating output directories
//! - Enumerating targets under a directory

use crate::error::{Result, TppError};
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decode bytes as UTF-8, replacing each invalid sequence with `replacement`.
pub fn decode_lossy(bytes: &[u8], replacement: char) -> String {
	let mut out = String::with_capacity(bytes.len());
	for chunk in bytes.utf8_chunks() {
		out.push_str(chunk.valid());
		if !chunk.invalid().is_empty() {
			out.push(replacement);
		}
	}
	out
}

/// Read a file as lines without their terminators.
///
/// A missing or unreadable file yields no lines.
pub fn read_lines_lossy(path: &Path, replacement: char) -> Vec<String> {
	let bytes = match std::fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => {
			tracing::debug!(path = %path.display(), "input file not found, treating as empty");
			return Vec::new();
		}
		Err(e) => {
			tracing::warn!(path = %path.display(), error = %e, "input file unreadable, treating as empty");
			return Vec::new();
		}
	};

	decode_lossy(&bytes, replacement)
		.lines()
		.map(str::to_string)
		.collect()
}

/// Write `text` with every `\n`-separated segment terminated by a newline.
///
/// Text ending in `\n` therefore gets a trailing blank line.
pub fn write_lines(path: &Path, text: &str) -> Result<()> {
	let mut body = String::with_capacity(text.len() + 1);
	for segment in text.split('\n') {
		body.push_str(segment);
		body.push('\n');
	}

	std::fs::write(path, body).map_err(|source| TppError::WriteFile {
		path: path.to_path_buf(),
		source,
	})
}

/// Create every missing ancestor directory of `path`.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
	let Some(parent) = path.parent() else {
		return Ok(());
	};
	if parent.as_os_str().is_empty() {
		return Ok(());
	}

	std::fs::create_dir_all(parent).map_err(|source| TppError::CreateDir {
		path: parent.to_path_buf(),
		source,
	})
}

/// Enumerate entries under `base`, sorted by file name.
///
/// - `filter`: only keep entries whose file name matches
/// - `recursive`: descend into subdirectories
/// - `dir_only`: return directories instead of files
pub fn collect_paths(
	base: &Path,
	filter: Option<&Regex>,
	recursive: bool,
	dir_only: bool,
) -> Result<Vec<PathBuf>> {
	let max_depth = if recursive { usize::MAX } else { 1 };
	let mut paths = Vec::new();

	for entry in WalkDir::new(base)
		.min_depth(1)
		.max_depth(max_depth)
		.sort_by_file_name()
	{
		let entry = entry.map_err(|source| TppError::ReadDir {
			path: base.to_path_buf(),
			source,
		})?;

		if entry.file_type().is_dir() != dir_only {
			continue;
		}
		if let Some(filter) = filter
			&& !filter.is_match(&entry.file_name().to_string_lossy())
		{
			continue;
		}
		paths.push(entry.into_path());
	}

	Ok(paths)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn test_decode_lossy_valid_utf8() {
		assert_eq!(decode_lossy("héllo".as_bytes(), '_'), "héllo");
	}

	#[test]
	fn test_decode_lossy_replaces_invalid_sequences() {
		assert_eq!(decode_lossy(b"a\xffb\xc3", '_'), "a_b_");
		assert_eq!(decode_lossy(b"a\xffb", '?'), "a?b");
	}

	#[test]
	fn test_read_lines_strips_terminators_only() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("in.txt");
		fs::write(&path, "  one  \r\ntwo\n\nthree").unwrap();

		assert_eq!(
			read_lines_lossy(&path, '_'),
			vec!["  one  ", "two", "", "three"]
		);
	}

	#[test]
	fn test_read_missing_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_lines_lossy(&dir.path().join("missing"), '_').is_empty());

		let empty = dir.path().join("empty.txt");
		fs::write(&empty, "").unwrap();
		assert!(read_lines_lossy(&empty, '_').is_empty());
	}

	#[test]
	fn test_write_lines_terminates_every_segment() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.txt");

		write_lines(&path, "a\nb").unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");

		write_lines(&path, "a\n").unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "a\n\n");

		write_lines(&path, "").unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "\n");
	}

	#[test]
	fn test_ensure_parent_dir_is_idempotent() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("a/b/c/out.txt");

		ensure_parent_dir(&path).unwrap();
		assert!(dir.path().join("a/b/c").is_dir());
		ensure_parent_dir(&path).unwrap();
		assert!(dir.path().join("a/b/c").is_dir());
	}

	#[test]
	fn test_ensure_parent_dir_bare_file_name() {
		assert!(ensure_parent_dir(Path::new("out.txt")).is_ok());
	}

	#[test]
	fn test_ensure_parent_dir_blocked_by_file() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("blocker"), "").unwrap();

		let result = ensure_parent_dir(&dir.path().join("blocker/out.txt"));
		assert!(matches!(result, Err(TppError::CreateDir { .. })));
	}

	fn make_tree() -> tempfile::TempDir {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("b.txt"), "").unwrap();
		fs::write(dir.path().join("a.log"), "").unwrap();
		fs::create_dir(dir.path().join("sub")).unwrap();
		fs::write(dir.path().join("sub/c.txt"), "").unwrap();
		dir
	}

	#[test]
	fn test_collect_files_top_level() {
		let dir = make_tree();
		let paths = collect_paths(dir.path(), None, false, false).unwrap();

		assert_eq!(paths, vec![dir.path().join("a.log"), dir.path().join("b.txt")]);
	}

	#[test]
	fn test_collect_files_recursive() {
		let dir = make_tree();
		let paths = collect_paths(dir.path(), None, true, false).unwrap();

		assert_eq!(
			paths,
			vec![
				dir.path().join("a.log"),
				dir.path().join("b.txt"),
				dir.path().join("sub/c.txt"),
			]
		);
	}

	#[test]
	fn test_collect_files_filtered() {
		let dir = make_tree();
		let filter = Regex::new(r"\.txt$").unwrap();
		let paths = collect_paths(dir.path(), Some(&filter), true, false).unwrap();

		assert_eq!(paths, vec![dir.path().join("b.txt"), dir.path().join("sub/c.txt")]);
	}

	#[test]
	fn test_collect_directories_only() {
		let dir = make_tree();
		let paths = collect_paths(dir.path(), None, false, true).unwrap();

		assert_eq!(paths, vec![dir.path().join("sub")]);
	}

	#[test]
	fn test_collect_missing_directory() {
		let result = collect_paths(Path::new("/nonexistent/dir"), None, false, false);
		assert!(matches!(result, Err(TppError::ReadDir { .. })));
	}
}
