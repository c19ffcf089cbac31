//! Rule-file parsing and rule types for tpp.
//!
//! This module handles:
//! - The marker-based rule-file grammar (`###`, `[[[…]]]`, `!!!`, `$$$`, `///`)
//! - Grouping rules by target-file pattern
//! - Applying a single rule to text

pub mod parser;
pub mod types;

pub use parser::{load_rules, parse_rules, parse_rules_str};
pub use types::{ReplaceFrom, Rule, RuleGroup, RuleSet};
