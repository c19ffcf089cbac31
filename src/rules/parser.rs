use crate::error::{Result, TppError};
use crate::files::decode_lossy;
use crate::rules::types::{Rule, RuleSet};
use regex::Regex;
use std::path::Path;

const COMMENT: &str = "###";
const TARGET_OPEN: &str = "[[[";
const TARGET_CLOSE: &str = "]]]";
const FROM: &str = "!!!";
const TO: &str = "$$$";
const REGEX: &str = "///";

/// Where the parser is relative to the marker blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Outside any block.
	Idle,
	/// Inside a multi-line `!!!` block.
	InFrom,
	/// A `!!!` block was closed; waiting for its `$$$` block.
	FromDone,
	/// Inside a multi-line `$$$` block.
	InTo,
	/// A `///…///` line was read; waiting for its `$$$` block.
	Regex,
}

/// A classified rule-file line. Payloads have their markers stripped.
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
	Comment,
	Target(&'a str),
	FromOpen(&'a str),
	FromLine(&'a str),
	FromClose(&'a str),
	ToOpen(&'a str),
	ToLine(&'a str),
	ToClose(&'a str),
	Regex(&'a str),
	Body(&'a str),
}

fn wrapped<'a>(line: &'a str, open: &str, close: &str, min_len: usize) -> Option<&'a str> {
	if line.len() >= min_len && line.starts_with(open) && line.ends_with(close) {
		Some(&line[open.len()..line.len() - close.len()])
	} else {
		None
	}
}

/// Classify a line. Open/close markers depend on the current state.
fn classify(line: &str, state: State) -> Token<'_> {
	if wrapped(line, COMMENT, COMMENT, 6).is_some() {
		return Token::Comment;
	}
	if let Some(pattern) = wrapped(line, TARGET_OPEN, TARGET_CLOSE, 6) {
		return Token::Target(pattern);
	}
	if state != State::InFrom
		&& let Some(rest) = line.strip_prefix(FROM)
	{
		return match rest.strip_suffix(FROM) {
			Some(inner) => Token::FromLine(inner),
			None => Token::FromOpen(rest),
		};
	}
	if state == State::InFrom
		&& let Some(inner) = line.strip_suffix(FROM)
	{
		return Token::FromClose(inner);
	}
	if state != State::InTo
		&& let Some(rest) = line.strip_prefix(TO)
	{
		return match rest.strip_suffix(TO) {
			Some(inner) => Token::ToLine(inner),
			None => Token::ToOpen(rest),
		};
	}
	if state == State::InTo
		&& let Some(inner) = line.strip_suffix(TO)
	{
		return Token::ToClose(inner);
	}
	if let Some(pattern) = wrapped(line, REGEX, REGEX, 7) {
		return Token::Regex(pattern);
	}
	Token::Body(line)
}

/// The from/to pair collected since the last commit.
#[derive(Debug, Default)]
struct Accumulator {
	from_lines: Vec<String>,
	from_pattern: Option<Regex>,
	to: Vec<String>,
}

impl Accumulator {
	fn push_from(&mut self, line: &str) {
		if !line.is_empty() {
			self.from_lines.push(line.to_string());
		}
	}

	fn push_to(&mut self, line: &str) {
		if !line.is_empty() {
			self.to.push(line.to_string());
		}
	}

	/// Turn the accumulated pair into a rule, or `None` if either side is missing.
	fn into_rule(self) -> Option<Rule> {
		if self.to.is_empty() {
			return None;
		}
		let to = self.to.join("\n");
		match self.from_pattern {
			Some(regex) => Some(Rule::pattern(regex, to)),
			None if self.from_lines.is_empty() => None,
			None => Some(Rule::literal(self.from_lines.join("\n"), to)),
		}
	}
}

/// Parser state threaded through the fold over lines.
#[derive(Debug)]
struct Parser {
	state: State,
	/// `None` until the first `###` or `[[[…]]]` line.
	target: Option<String>,
	pending: Accumulator,
	rules: RuleSet,
}

impl Parser {
	fn new() -> Self {
		Parser {
			state: State::Idle,
			target: None,
			pending: Accumulator::default(),
			rules: RuleSet::new(),
		}
	}

	/// Finalize the pending pair under the current target and reset it.
	fn commit(&mut self) {
		let pending = std::mem::take(&mut self.pending);
		let Some(rule) = pending.into_rule() else {
			return;
		};
		match &self.target {
			Some(pattern) => {
				tracing::trace!(pattern = %pattern, from = %rule.from, "committed rule");
				self.rules.push(pattern, rule);
			}
			None => tracing::debug!(from = %rule.from, "dropped rule declared before any section"),
		}
	}

	fn step(mut self, line_no: usize, line: &str) -> Result<Self> {
		let previous = self.state;

		self.state = match classify(line, previous) {
			Token::Comment => {
				self.commit();
				self.target = Some(String::new());
				State::Idle
			}
			Token::Target(pattern) => {
				self.commit();
				self.target = Some(pattern.to_string());
				State::Idle
			}
			Token::FromOpen(text) => {
				self.commit();
				self.pending.push_from(text);
				State::InFrom
			}
			Token::FromLine(text) => {
				self.commit();
				self.pending.push_from(text);
				State::FromDone
			}
			Token::FromClose(text) => {
				self.pending.push_from(text);
				State::FromDone
			}
			Token::ToOpen(text) => {
				self.pending.push_to(text);
				State::InTo
			}
			Token::ToLine(text) | Token::ToClose(text) => {
				self.pending.push_to(text);
				self.commit();
				State::Idle
			}
			Token::Regex(pattern) => {
				if previous != State::Regex {
					self.commit();
				}
				let regex = Regex::new(pattern).map_err(|source| TppError::InvalidRegex {
					line: line_no,
					pattern: pattern.to_string(),
					source,
				})?;
				self.pending.from_pattern = Some(regex);
				State::Regex
			}
			Token::Body(text) => {
				match previous {
					State::InFrom => self.pending.push_from(text),
					State::InTo => self.pending.push_to(text),
					_ => {}
				}
				previous
			}
		};

		Ok(self)
	}

	fn finish(mut self) -> RuleSet {
		self.commit();
		self.rules
	}
}

/// Parse rule-file lines into a rule set.
///
/// Lines must already have their terminators removed. Trailing whitespace is
/// significant and kept. Rules declared before the first `###…###` or
/// `[[[…]]]` line belong to no section and are dropped.
pub fn parse_rules<'a, I>(lines: I) -> Result<RuleSet>
where
	I: IntoIterator<Item = &'a str>,
{
	let parser = lines
		.into_iter()
		.enumerate()
		.try_fold(Parser::new(), |parser, (i, line)| parser.step(i + 1, line))?;
	Ok(parser.finish())
}

/// Parse rule-file content (useful for testing).
pub fn parse_rules_str(content: &str) -> Result<RuleSet> {
	parse_rules(content.lines())
}

/// Load and parse a rule file, repairing invalid UTF-8 with `replacement`.
pub fn load_rules(path: &Path, replacement: char) -> Result<RuleSet> {
	let bytes = std::fs::read(path).map_err(|source| TppError::RuleFileRead {
		path: path.to_path_buf(),
		source,
	})?;
	let rules = parse_rules_str(&decode_lossy(&bytes, replacement))?;
	tracing::debug!(
		path = %path.display(),
		groups = rules.len(),
		rules = rules.rule_count(),
		"loaded rule file"
	);
	Ok(rules)
}
