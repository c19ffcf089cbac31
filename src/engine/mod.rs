//! Substitution engine for tpp.
//!
//! This module handles:
//! - Selecting the rule groups that apply to a target path
//! - Applying rules in declaration order to a file's full text
//! - Writing the result in place or to an alternate output path

pub mod batch;

pub use batch::{BatchFailure, BatchReport, ErrorPolicy, run_batch};

use crate::error::Result;
use crate::files;
use crate::rules::{RuleGroup, RuleSet};
use std::path::{Path, PathBuf};

/// Placeholder for invalid UTF-8 sequences in input files.
pub const DEFAULT_REPLACEMENT_CHAR: char = '_';

/// Per-file processing options.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
	/// Character substituted for invalid UTF-8 sequences.
	pub replacement_char: char,
}

impl Default for ProcessOptions {
	fn default() -> Self {
		ProcessOptions {
			replacement_char: DEFAULT_REPLACEMENT_CHAR,
		}
	}
}

/// Result of processing one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
	/// Input file that was read.
	pub input: PathBuf,

	/// File that was written.
	pub output: PathBuf,

	/// Whether any rule changed the text.
	pub changed: bool,

	/// Number of rule groups whose pattern matched the input path.
	pub groups_applied: usize,
}

fn apply_groups(groups: &[&RuleGroup], text: &str) -> String {
	groups
		.iter()
		.flat_map(|group| group.rules.iter())
		.fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Apply every rule whose group matches `path` to `text`.
///
/// Each rule sees the output of the previous one.
pub fn apply_rules(rule_set: &RuleSet, path: &str, text: &str) -> Result<String> {
	let groups = rule_set.matching_groups(path)?;
	Ok(apply_groups(&groups, text))
}

/// Read `input`, apply the matching rules, and write the result.
///
/// The result goes to `output` when given, otherwise back to `input`. Missing
/// parent directories of the output path are created. A missing or zero-byte
/// input has no lines, so no rules run on it and the output is a single empty
/// line.
pub fn process_file(
	rule_set: &RuleSet,
	input: &Path,
	output: Option<&Path>,
	options: &ProcessOptions,
) -> Result<ProcessOutcome> {
	let lines = files::read_lines_lossy(input, options.replacement_char);
	let original = lines.join("\n");

	let (text, groups_applied) = if lines.is_empty() {
		tracing::debug!(path = %input.display(), "no input lines, skipping rules");
		(original.clone(), 0)
	} else {
		let path_str = input.to_string_lossy();
		let groups = rule_set.matching_groups(&path_str)?;
		tracing::debug!(path = %path_str, groups = groups.len(), "matched rule groups");
		(apply_groups(&groups, &original), groups.len())
	};

	let output = output.unwrap_or(input);
	files::ensure_parent_dir(output)?;
	files::write_lines(output, &text)?;

	let changed = text != original;
	tracing::info!(
		input = %input.display(),
		output = %output.display(),
		changed,
		"wrote file"
	);

	Ok(ProcessOutcome {
		input: input.to_path_buf(),
		output: output.to_path_buf(),
		changed,
		groups_applied,
	})
}
