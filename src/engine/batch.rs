use crate::engine::{ProcessOptions, ProcessOutcome, process_file};
use crate::error::{Result, TppError};
use crate::rules::RuleSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to do when one file of a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
	/// Log the failure and move on to the next file.
	#[default]
	Continue,

	/// Stop at the first failure.
	Abort,
}

/// A file that could not be processed.
#[derive(Debug)]
pub struct BatchFailure {
	pub path: PathBuf,
	pub error: TppError,
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
	pub processed: Vec<ProcessOutcome>,
	pub failures: Vec<BatchFailure>,
}

impl BatchReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}

	pub fn changed_count(&self) -> usize {
		self.processed.iter().filter(|o| o.changed).count()
	}
}

/// Process every target in order with the same rule set.
///
/// With [`ErrorPolicy::Abort`] the first error is returned and later targets
/// are left untouched.
pub fn run_batch(
	rule_set: &RuleSet,
	targets: &[PathBuf],
	output: Option<&Path>,
	options: &ProcessOptions,
	policy: ErrorPolicy,
) -> Result<BatchReport> {
	let mut report = BatchReport::default();

	for target in targets {
		match process_file(rule_set, target, output, options) {
			Ok(outcome) => report.processed.push(outcome),
			Err(error) => match policy {
				ErrorPolicy::Abort => return Err(error),
				ErrorPolicy::Continue => {
					tracing::warn!(path = %target.display(), error = %error, "skipping file");
					report.failures.push(BatchFailure {
						path: target.clone(),
						error,
					});
				}
			},
		}
	}

	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rules::parse_rules_str;
	use std::fs;

	/// Two good files around one whose parent path is a regular file.
	fn make_targets(dir: &Path) -> Vec<PathBuf> {
		fs::write(dir.join("one.txt"), "foo\n").unwrap();
		fs::write(dir.join("blocker"), "").unwrap();
		fs::write(dir.join("two.txt"), "foo\n").unwrap();
		vec![
			dir.join("one.txt"),
			dir.join("blocker/bad.txt"),
			dir.join("two.txt"),
		]
	}

	#[test]
	fn test_continue_policy_skips_failing_file() {
		let dir = tempfile::tempdir().unwrap();
		let targets = make_targets(dir.path());
		let rules = parse_rules_str("######\n!!!foo!!!\n$$$bar$$$\n").unwrap();

		let report = run_batch(
			&rules,
			&targets,
			None,
			&ProcessOptions::default(),
			ErrorPolicy::Continue,
		)
		.unwrap();

		assert!(!report.is_success());
		assert_eq!(report.processed.len(), 2);
		assert_eq!(report.changed_count(), 2);
		assert_eq!(report.failures.len(), 1);
		assert_eq!(report.failures[0].path, targets[1]);
		assert!(matches!(report.failures[0].error, TppError::CreateDir { .. }));
		assert_eq!(fs::read_to_string(&targets[2]).unwrap(), "bar\n");
	}

	#[test]
	fn test_abort_policy_stops_at_first_failure() {
		let dir = tempfile::tempdir().unwrap();
		let targets = make_targets(dir.path());
		let rules = parse_rules_str("######\n!!!foo!!!\n$$$bar$$$\n").unwrap();

		let result = run_batch(
			&rules,
			&targets,
			None,
			&ProcessOptions::default(),
			ErrorPolicy::Abort,
		);

		assert!(matches!(result, Err(TppError::CreateDir { .. })));
		assert_eq!(fs::read_to_string(&targets[0]).unwrap(), "bar\n");
		assert_eq!(fs::read_to_string(&targets[2]).unwrap(), "foo\n");
	}

	#[test]
	fn test_same_rules_for_every_file() {
		let dir = tempfile::tempdir().unwrap();
		let a = dir.path().join("a.txt");
		let b = dir.path().join("b.log");
		fs::write(&a, "x\n").unwrap();
		fs::write(&b, "x\n").unwrap();
		let rules = parse_rules_str("[[[\\.txt$]]]\n!!!x!!!\n$$$y$$$\n######\n!!!x!!!\n$$$z$$$\n").unwrap();

		let report = run_batch(
			&rules,
			&[a.clone(), b.clone()],
			None,
			&ProcessOptions::default(),
			ErrorPolicy::Continue,
		)
		.unwrap();

		assert!(report.is_success());
		assert_eq!(fs::read_to_string(&a).unwrap(), "y\n");
		assert_eq!(fs::read_to_string(&b).unwrap(), "z\n");
	}

	#[test]
	fn test_error_policy_from_toml() {
		#[derive(Deserialize)]
		struct Wrapper {
			policy: ErrorPolicy,
		}

		let parsed: Wrapper = toml::from_str(r#"policy = "abort""#).unwrap();
		assert_eq!(parsed.policy, ErrorPolicy::Abort);
		let parsed: Wrapper = toml::from_str(r#"policy = "continue""#).unwrap();
		assert_eq!(parsed.policy, ErrorPolicy::Continue);
	}
}
