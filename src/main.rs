use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use url_redirector::config::{RuleStore, is_valid_destination, resolve_rules_path};
use url_redirector::rules::{PatternKind, classify, explain, export_json, find_match};
use url_redirector::session::Session;

const INIT_TEMPLATE: &str = r#"# url-redirector rules
#
# Rules are evaluated top to bottom; the first matching rule wins.
#
# How `from` is interpreted:
# - contains `*`            -> wildcard, must match the whole URL, `to` used as-is
# - scheme+host only, ends
#   with `/`, or ends with a
#   path segment without `.` -> prefix, the rest of the URL is appended to `to`
# - anything else           -> exact match, `to` used as-is
#
# Run `redirector explain <FROM>` to see how a pattern is classified.

[[rules]]
from = "https://www.google.com/search"
to = "https://duckduckgo.com/"

# [[rules]]
# from = "https://old.example.com"
# to = "https://new.example.com"

# [[rules]]
# from = "https://*.example.com/*"
# to = "https://example.org/"
"#;

#[derive(Parser)]
#[command(name = "redirector")]
#[command(
	author,
	version,
	about = "CLI tool for rewriting URLs with prefix, wildcard and exact redirect rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Rules file to use (defaults to $REDIRECTOR_RULES, then the user config directory)
	#[arg(long, global = true, value_name = "PATH")]
	rules: Option<PathBuf>,

	/// Increase log verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the redirect destination for each URL
	Match {
		/// URLs to evaluate
		#[arg(required = true)]
		urls: Vec<String>,
	},
	/// Read URLs from stdin and print a line for each redirect
	Watch,
	/// Rule list management commands
	Rules {
		#[command(subcommand)]
		action: RulesAction,
	},
	/// Show how a `from` pattern will be matched
	Explain {
		/// Source pattern to classify
		from: String,
	},
	/// Check the rules file for errors and likely mistakes
	Check,
	/// Print the rules as browser declarative redirect rules (JSON)
	Export,
	/// Create a template rules file
	Init {
		/// Overwrite an existing rules file
		#[arg(long)]
		force: bool,
	},
}

#[derive(Subcommand)]
enum RulesAction {
	/// List rules in evaluation order
	List,
	/// Append a rule
	Add {
		/// Source pattern
		from: String,
		/// Destination URL
		to: String,
	},
	/// Remove a rule by its position in `rules list`
	Remove {
		/// 1-based rule position
		position: usize,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: u8) {
	let default_filter = match verbose {
		0 => "url_redirector=warn",
		1 => "url_redirector=info",
		_ => "url_redirector=debug",
	};

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let explicit_rules = cli.rules;
	// Only commands that touch the rules file resolve its location
	let rules_path = || -> Result<PathBuf> {
		resolve_rules_path(explicit_rules.as_deref()).context("Failed to locate rules file")
	};

	match cli.command {
		Commands::Match { urls } => handle_match(&rules_path()?, &urls),
		Commands::Watch => handle_watch(&rules_path()?),
		Commands::Rules { action } => match action {
			RulesAction::List => handle_rules_list(&rules_path()?),
			RulesAction::Add { from, to } => handle_rules_add(&rules_path()?, &from, &to),
			RulesAction::Remove { position } => handle_rules_remove(&rules_path()?, position),
		},
		Commands::Explain { from } => handle_explain(&from),
		Commands::Check => handle_check(&rules_path()?),
		Commands::Export => handle_export(&rules_path()?),
		Commands::Init { force } => handle_init(&rules_path()?, force),
	}
}

fn open_store(path: &Path) -> Result<RuleStore> {
	RuleStore::open(path).with_context(|| format!("Failed to load rules from {}", path.display()))
}

fn handle_match(rules_path: &Path, urls: &[String]) -> Result<ExitCode> {
	let store = open_store(rules_path)?;
	let rules = store.compile();

	let mut all_matched = true;
	for url in urls {
		match find_match(url, &rules) {
			Some(m) => println!("{}", m.destination),
			None => {
				eprintln!("No matching rule: {}", url);
				all_matched = false;
			}
		}
	}

	Ok(if all_matched {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

fn handle_watch(rules_path: &Path) -> Result<ExitCode> {
	let mut store = open_store(rules_path)?;
	let mut session = Session::new(store.rules(), store.version());

	let stdin = std::io::stdin();
	let mut stdout = std::io::stdout().lock();

	for line in stdin.lock().lines() {
		let line = line.context("Failed to read URL from stdin")?;
		let url = line.trim();
		if url.is_empty() {
			continue;
		}

		// Keep the previous rules if the file is mid-edit or broken
		match store.reload_if_changed() {
			Ok(true) => session.replace_rules(store.rules(), store.version()),
			Ok(false) => {}
			Err(e) => tracing::warn!(error = %e, "Failed to reload rules, keeping previous version"),
		}

		if let Some(redirect) = session.observe(url) {
			writeln!(stdout, "{} -> {}", url, redirect.destination)?;
			stdout.flush()?;
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules_list(rules_path: &Path) -> Result<ExitCode> {
	let store = open_store(rules_path)?;

	if store.rules().is_empty() {
		println!("No rules configured.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("# Source: {}", store.path().display());
	println!();
	for (i, rule) in store.rules().iter().enumerate() {
		println!("  {}. [{}] {} -> {}", i + 1, classify(&rule.from), rule.from, rule.to);
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules_add(rules_path: &Path, from: &str, to: &str) -> Result<ExitCode> {
	let mut store = open_store(rules_path)?;
	let rule = store.add_rule(from, to).context("Failed to add rule")?;

	println!(
		"Rule added successfully: [{}] {} -> {}",
		classify(&rule.from),
		rule.from,
		rule.to
	);
	Ok(ExitCode::SUCCESS)
}

fn handle_rules_remove(rules_path: &Path, position: usize) -> Result<ExitCode> {
	if position == 0 {
		anyhow::bail!("Rule positions start at 1");
	}

	let mut store = open_store(rules_path)?;
	let removed = store
		.remove_rule(position - 1)
		.context("Failed to remove rule")?;

	println!("Rule removed successfully: {} -> {}", removed.from, removed.to);
	Ok(ExitCode::SUCCESS)
}

fn handle_explain(from: &str) -> Result<ExitCode> {
	let c = explain(from);

	println!("{}: {}", from, c.kind);
	println!("  contains `*`:              {}", c.has_wildcard);
	println!("  likely prefix:             {}", c.likely_prefix);
	println!("  ends with bare segment:    {}", c.ends_with_path_segment);

	match c.kind {
		PatternKind::Wildcard => {
			println!("  Matches the whole URL; `*` matches any text. The destination is used as-is.")
		}
		PatternKind::Prefix => {
			println!("  Matches URLs starting with this text; the rest is appended to the destination.")
		}
		PatternKind::Exact => {
			println!("  Matches only this exact URL. The destination is used as-is.")
		}
	}

	if c.dotted_segment_matched_exactly {
		println!(
			"  warning: the final path segment contains a `.` that is not a file extension; \
			 add a trailing `/` to match everything below it"
		);
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_check(rules_path: &Path) -> Result<ExitCode> {
	let store = match RuleStore::open(rules_path) {
		Ok(store) => store,
		Err(e) => {
			eprintln!("Rules error: {}", e);
			return Ok(ExitCode::FAILURE);
		}
	};

	if store.rules().is_empty() {
		println!("No rules configured.");
		return Ok(ExitCode::SUCCESS);
	}

	println!(
		"All rules are valid: {} ({} rules)",
		store.path().display(),
		store.rules().len()
	);

	for from in store.file().duplicate_sources() {
		println!(
			"  warning: duplicate pattern {} (only the first rule can match)",
			from
		);
	}

	for (i, rule) in store.rules().iter().enumerate() {
		if explain(&rule.from).dotted_segment_matched_exactly {
			println!(
				"  warning: rule {} ({}) only matches exactly; the final path segment contains a `.`",
				i + 1,
				rule.from
			);
		}
		if !is_valid_destination(&rule.to) {
			println!(
				"  warning: rule {} has a destination that is not a valid URL: {}",
				i + 1,
				rule.to
			);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_export(rules_path: &Path) -> Result<ExitCode> {
	let store = open_store(rules_path)?;
	let json = export_json(&store.compile()).context("Failed to export rules")?;
	println!("{}", json);
	Ok(ExitCode::SUCCESS)
}

fn handle_init(rules_path: &Path, force: bool) -> Result<ExitCode> {
	if rules_path.exists() && !force {
		anyhow::bail!(
			"{} already exists. Use --force to overwrite.",
			rules_path.display()
		);
	}

	if let Some(parent) = rules_path.parent()
		&& !parent.as_os_str().is_empty()
	{
		std::fs::create_dir_all(parent)
			.with_context(|| format!("Failed to create {}", parent.display()))?;
	}

	std::fs::write(rules_path, INIT_TEMPLATE)
		.with_context(|| format!("Failed to write {}", rules_path.display()))?;

	println!("Created {}", rules_path.display());
	Ok(ExitCode::SUCCESS)
}
