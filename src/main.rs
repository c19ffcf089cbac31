use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tpp_cli::config::{Settings, load_settings};
use tpp_cli::engine::{ErrorPolicy, ProcessOptions, run_batch};
use tpp_cli::files::collect_paths;
use tpp_cli::rules::load_rules;

/// Exit code for missing positional arguments.
const USAGE_EXIT_CODE: u8 = 255;

#[derive(Parser)]
#[command(name = "tpp")]
#[command(
	author,
	version,
	about = "Batch find/replace driven by a marker-based rule file"
)]
struct Cli {
	/// File or directory to process
	#[arg(value_name = "TARGET")]
	target: Option<PathBuf>,

	/// Rule file describing the substitutions
	#[arg(value_name = "RULE_FILE")]
	rule_file: Option<PathBuf>,

	/// Write the result to PATH instead of rewriting TARGET in place
	#[arg(
		short = 'o',
		long = "out-file",
		visible_alias = "outFile",
		value_name = "PATH"
	)]
	out_file: Option<PathBuf>,

	/// Print the parsed rules and log progress
	#[arg(short, long)]
	verbose: bool,

	/// Descend into subdirectories when TARGET is a directory
	#[arg(short, long)]
	recursive: bool,

	/// Only process files whose name matches REGEX when TARGET is a directory
	#[arg(short = 'f', long, value_name = "REGEX")]
	filter: Option<String>,

	/// Stop at the first file that fails instead of skipping it
	#[arg(long)]
	fail_fast: bool,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	let (Some(target), Some(rule_file)) = (cli.target.as_deref(), cli.rule_file.as_deref()) else {
		println!(
			"Please specify {} targetFile ruleFile",
			env!("CARGO_BIN_NAME")
		);
		return Ok(ExitCode::from(USAGE_EXIT_CODE));
	};

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let settings = load_settings(&cwd).context("Failed to load configuration")?;

	let verbose = cli.verbose || settings.verbose;
	init_tracing(verbose);
	for source in &settings.sources {
		tracing::info!(path = %source.display(), "loaded config");
	}

	let rules = load_rules(rule_file, settings.replacement_char)
		.with_context(|| format!("Failed to load rules from {}", rule_file.display()))?;
	if verbose {
		print!("{rules}");
	}

	let targets = collect_targets(target, &cli, &settings)?;
	if cli.out_file.is_some() && targets.len() > 1 {
		tracing::warn!(
			count = targets.len(),
			"--out-file given for several targets; each result overwrites the previous one"
		);
	}

	let policy = if cli.fail_fast {
		ErrorPolicy::Abort
	} else {
		settings.on_error
	};
	let options = ProcessOptions {
		replacement_char: settings.replacement_char,
	};

	let report = run_batch(&rules, &targets, cli.out_file.as_deref(), &options, policy)
		.context("Processing aborted")?;

	tracing::info!(
		processed = report.processed.len(),
		changed = report.changed_count(),
		failed = report.failures.len(),
		"done"
	);

	if report.is_success() {
		Ok(ExitCode::SUCCESS)
	} else {
		let total = report.processed.len() + report.failures.len();
		let failed = report.failures.len();
		for failure in report.failures {
			eprintln!(
				"error: {}: {:?}",
				failure.path.display(),
				anyhow::Error::from(failure.error)
			);
		}
		eprintln!("{failed} of {total} files failed");
		Ok(ExitCode::FAILURE)
	}
}

/// Log to stderr so the rule dump on stdout stays clean.
fn init_tracing(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("info")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

/// Expand TARGET into the list of files to process.
fn collect_targets(target: &Path, cli: &Cli, settings: &Settings) -> Result<Vec<PathBuf>> {
	if !target.is_dir() {
		return Ok(vec![target.to_path_buf()]);
	}

	let filter = cli
		.filter
		.as_ref()
		.or(settings.file_filter.as_ref())
		.map(|pattern| {
			Regex::new(pattern).with_context(|| format!("Invalid file filter: {pattern}"))
		})
		.transpose()?;
	let recursive = cli.recursive || settings.recursive;

	collect_paths(target, filter.as_ref(), recursive, false)
		.with_context(|| format!("Failed to list {}", target.display()))
}
