//! tpp - batch find/replace driven by a marker-based rule file.
//!
//! This library provides the core functionality for tpp, including:
//! - Rule-file parsing into pattern-scoped rule groups
//! - Applying rules to whole files, in place or to another path
//! - Batch processing with a configurable failure policy
//! - Configuration file parsing and cascade discovery
//!
//! # Example
//!
//! ```no_run
//! use tpp_cli::engine::{ProcessOptions, process_file};
//! use tpp_cli::rules::parse_rules_str;
//! use std::path::Path;
//!
//! let rules = parse_rules_str("[[[\\.txt$]]]\n!!!world!!!\n$$$there$$$\n").unwrap();
//! let outcome = process_file(
//!     &rules,
//!     Path::new("notes.txt"),
//!     None,
//!     &ProcessOptions::default(),
//! )
//! .unwrap();
//! println!("changed: {}", outcome.changed);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod files;
pub mod rules;

pub use error::{Result, TppError};
