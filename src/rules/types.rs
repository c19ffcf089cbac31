use crate::error::{Result, TppError};
use regex::Regex;
use std::fmt;

/// The search side of a rule.
#[derive(Debug, Clone)]
pub enum ReplaceFrom {
	/// Matched verbatim.
	Literal(String),

	/// Declared with a `///…///` line.
	Pattern(Regex),
}

impl ReplaceFrom {
	/// Replace every occurrence in `text` with `to`.
	///
	/// Literal rules insert `to` verbatim. Pattern rules expand `$1` / `${name}`
	/// capture references in `to`.
	pub fn replace_all(&self, text: &str, to: &str) -> String {
		match self {
			ReplaceFrom::Literal(from) => text.replace(from.as_str(), to),
			ReplaceFrom::Pattern(regex) => regex.replace_all(text, to).into_owned(),
		}
	}
}

impl PartialEq for ReplaceFrom {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(ReplaceFrom::Literal(a), ReplaceFrom::Literal(b)) => a == b,
			(ReplaceFrom::Pattern(a), ReplaceFrom::Pattern(b)) => a.as_str() == b.as_str(),
			_ => false,
		}
	}
}

impl fmt::Display for ReplaceFrom {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ReplaceFrom::Literal(from) => write!(f, "{from:?}"),
			ReplaceFrom::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
		}
	}
}

/// A single substitution directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
	pub from: ReplaceFrom,
	pub to: String,
}

impl Rule {
	pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
		Rule {
			from: ReplaceFrom::Literal(from.into()),
			to: to.into(),
		}
	}

	pub fn pattern(from: Regex, to: impl Into<String>) -> Self {
		Rule {
			from: ReplaceFrom::Pattern(from),
			to: to.into(),
		}
	}

	/// Apply this rule to the whole text.
	pub fn apply(&self, text: &str) -> String {
		self.from.replace_all(text, &self.to)
	}
}

/// Rules declared under one target-file pattern.
///
/// The pattern is compiled once when the group is created. An invalid pattern
/// is kept and reported each time the group is matched.
#[derive(Debug, Clone)]
pub struct RuleGroup {
	/// Regex matched against the target path. Empty matches every path.
	pattern: String,

	/// `None` for the empty pattern.
	matcher: Option<std::result::Result<Regex, regex::Error>>,

	/// Rules in declaration order.
	pub rules: Vec<Rule>,
}

impl RuleGroup {
	pub fn new(pattern: impl Into<String>) -> Self {
		let pattern = pattern.into();
		let matcher = (!pattern.is_empty()).then(|| Regex::new(&pattern));
		RuleGroup {
			pattern,
			matcher,
			rules: Vec::new(),
		}
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Check whether this group applies to the given path.
	pub fn matches(&self, path: &str) -> Result<bool> {
		match &self.matcher {
			None => Ok(true),
			Some(Ok(regex)) => Ok(regex.is_match(path)),
			Some(Err(source)) => Err(TppError::InvalidFilePattern {
				pattern: self.pattern.clone(),
				source: source.clone(),
			}),
		}
	}
}

impl PartialEq for RuleGroup {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern && self.rules == other.rules
	}
}

/// Ordered mapping from target-file pattern to rules.
///
/// Groups keep the order in which their pattern was first declared. Declaring
/// the same pattern again appends to the existing group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
	groups: Vec<RuleGroup>,
}

impl RuleSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a rule to the group for `pattern`, creating it if needed.
	pub fn push(&mut self, pattern: &str, rule: Rule) {
		match self.groups.iter_mut().find(|g| g.pattern == pattern) {
			Some(group) => group.rules.push(rule),
			None => {
				let mut group = RuleGroup::new(pattern);
				group.rules.push(rule);
				self.groups.push(group);
			}
		}
	}

	/// Rules declared for exactly this pattern.
	pub fn get(&self, pattern: &str) -> Option<&[Rule]> {
		self.groups
			.iter()
			.find(|g| g.pattern == pattern)
			.map(|g| g.rules.as_slice())
	}

	pub fn groups(&self) -> &[RuleGroup] {
		&self.groups
	}

	/// Number of pattern groups.
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// Total number of rules across all groups.
	pub fn rule_count(&self) -> usize {
		self.groups.iter().map(|g| g.rules.len()).sum()
	}

	/// Groups whose pattern matches `path`, in declaration order.
	pub fn matching_groups(&self, path: &str) -> Result<Vec<&RuleGroup>> {
		let mut matched = Vec::new();
		for group in &self.groups {
			if group.matches(path)? {
				matched.push(group);
			}
		}
		Ok(matched)
	}
}

impl fmt::Display for RuleSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.groups.is_empty() {
			return writeln!(f, "No rules defined.");
		}

		for group in &self.groups {
			if group.pattern().is_empty() {
				writeln!(f, "[all files]")?;
			} else {
				writeln!(f, "[{}]", group.pattern())?;
			}
			for (i, rule) in group.rules.iter().enumerate() {
				writeln!(f, "  Rule {}:", i + 1)?;
				writeln!(f, "    from: {}", rule.from)?;
				writeln!(f, "    to: {:?}", rule.to)?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_literal_replaces_all_occurrences() {
		let rule = Rule::literal("foo", "bar");
		assert_eq!(rule.apply("foo foo foo"), "bar bar bar");
	}

	#[test]
	fn test_literal_does_not_interpret_regex() {
		let rule = Rule::literal("a.b", "X");
		assert_eq!(rule.apply("aXb a.b"), "aXb X");
	}

	#[test]
	fn test_literal_replacement_is_verbatim() {
		let rule = Rule::literal("price", "$5");
		assert_eq!(rule.apply("price"), "$5");
	}

	#[test]
	fn test_pattern_matches_any_char() {
		let rule = Rule::pattern(Regex::new("a.b").unwrap(), "X");
		assert_eq!(rule.apply("aXb a.b"), "X X");
	}

	#[test]
	fn test_pattern_expands_capture_groups() {
		let rule = Rule::pattern(Regex::new(r"(\w+)@(\w+)").unwrap(), "$2 at $1");
		assert_eq!(rule.apply("user@host"), "host at user");
	}

	#[test]
	fn test_push_groups_by_pattern_in_declaration_order() {
		let mut set = RuleSet::new();
		set.push(r"\.txt$", Rule::literal("a", "b"));
		set.push("", Rule::literal("c", "d"));
		set.push(r"\.txt$", Rule::literal("e", "f"));

		assert_eq!(set.len(), 2);
		assert_eq!(set.rule_count(), 3);
		assert_eq!(set.groups()[0].pattern(), r"\.txt$");
		assert_eq!(set.groups()[1].pattern(), "");
		assert_eq!(
			set.get(r"\.txt$").unwrap(),
			&[Rule::literal("a", "b"), Rule::literal("e", "f")]
		);
	}

	#[test]
	fn test_empty_pattern_matches_every_path() {
		let group = RuleGroup::new("");
		assert!(group.matches("anything.log").unwrap());
		assert!(group.matches("").unwrap());
	}

	#[test]
	fn test_pattern_scoping() {
		let group = RuleGroup::new(r"\.txt$");
		assert!(group.matches("dir/foo.txt").unwrap());
		assert!(!group.matches("dir/foo.log").unwrap());
	}

	#[test]
	fn test_invalid_file_pattern() {
		let group = RuleGroup::new("*.txt");
		for path in ["foo.txt", "bar.txt"] {
			match group.matches(path).unwrap_err() {
				TppError::InvalidFilePattern { pattern, .. } => assert_eq!(pattern, "*.txt"),
				other => panic!("Expected InvalidFilePattern error, got {other:?}"),
			}
		}
	}

	#[test]
	fn test_group_compiles_pattern_once() {
		let group = RuleGroup::new(r"\.txt$");
		let cloned = group.clone();

		assert!(matches!(&group.matcher, Some(Ok(regex)) if regex.as_str() == r"\.txt$"));
		assert!(cloned.matches("a.txt").unwrap());
		assert!(!cloned.matches("a.log").unwrap());
		assert!(RuleGroup::new("").matcher.is_none());
	}

	#[test]
	fn test_display_lists_groups_and_rules() {
		let mut set = RuleSet::new();
		set.push("", Rule::literal("line1\nline2", "x"));
		set.push("foo", Rule::pattern(Regex::new("a.b").unwrap(), "y"));

		let shown = set.to_string();
		assert!(shown.contains("[all files]"));
		assert!(shown.contains(r#"from: "line1\nline2""#));
		assert!(shown.contains("[foo]"));
		assert!(shown.contains("from: /a.b/"));
		assert!(shown.contains(r#"to: "y""#));
	}

	#[test]
	fn test_display_empty_rule_set() {
		assert_eq!(RuleSet::new().to_string(), "No rules defined.\n");
	}
}
