//! The authoritative rule list: rules file location, loading, validated
//! editing and change detection.

use crate::config::parser::{parse_rules_file, to_toml_string};
use crate::config::types::{Rule, RulesFile};
use crate::error::{RedirectorError, Result};
use crate::rules::{CompiledRule, compile_rules};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::{debug, info};

/// Environment variable overriding the rules file location.
pub const RULES_PATH_ENV_VAR: &str = "REDIRECTOR_RULES";

static DOMAIN_LIKE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("static regex is valid")
});

/// Get the default rules file path in the user's config directory.
pub fn default_rules_path() -> Result<PathBuf> {
	let config_dir = dirs::config_dir().ok_or(RedirectorError::ConfigDirectoryNotFound)?;
	Ok(config_dir.join("url-redirector").join("rules.toml"))
}

/// Decide which rules file to use.
///
/// The order is:
/// 1. An explicit path (from `--rules`)
/// 2. `$REDIRECTOR_RULES`, if set and non-empty
/// 3. The default path in the user's config directory
pub fn resolve_rules_path(explicit: Option<&Path>) -> Result<PathBuf> {
	if let Some(path) = explicit {
		return Ok(path.to_path_buf());
	}

	if let Ok(value) = std::env::var(RULES_PATH_ENV_VAR)
		&& !value.is_empty()
	{
		return Ok(PathBuf::from(value));
	}

	default_rules_path()
}

/// Check that a destination looks usable.
///
/// Accepts glob destinations, absolute URLs, and bare domains such as
/// `example.com/path`.
pub fn is_valid_destination(to: &str) -> bool {
	to.contains('*') || url::Url::parse(to).is_ok() || DOMAIN_LIKE.is_match(to)
}

/// The authoritative rule list, backed by a TOML file.
///
/// Every load or mutation bumps `version`, so callers holding compiled rules
/// can tell when to recompile.
#[derive(Debug)]
pub struct RuleStore {
	path: PathBuf,
	file: RulesFile,
	version: u64,
	modified: Option<SystemTime>,
}

impl RuleStore {
	/// Open the rules file at `path`. A missing file yields an empty store.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let mut store = RuleStore {
			path: path.into(),
			file: RulesFile::default(),
			version: 0,
			modified: None,
		};
		store.load()?;
		Ok(store)
	}

	/// Reload the rules file from disk.
	pub fn load(&mut self) -> Result<()> {
		self.file = parse_rules_file(&self.path)?;
		self.modified = modified_time(&self.path);
		self.version += 1;
		info!(
			path = %self.path.display(),
			rules = self.file.rules.len(),
			version = self.version,
			"Redirect rules loaded"
		);
		Ok(())
	}

	/// Reload only if the file's modification time changed since the last
	/// load or save. Returns whether a reload happened.
	pub fn reload_if_changed(&mut self) -> Result<bool> {
		let current = modified_time(&self.path);
		if current == self.modified {
			return Ok(false);
		}
		debug!(path = %self.path.display(), "Rules file changed on disk");
		self.load()?;
		Ok(true)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn rules(&self) -> &[Rule] {
		&self.file.rules
	}

	pub fn file(&self) -> &RulesFile {
		&self.file
	}

	/// Current rule-list version.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Compile the whole rule list.
	pub fn compile(&self) -> Vec<CompiledRule> {
		compile_rules(&self.file.rules)
	}

	/// Validate and append a rule, then save.
	///
	/// Both fields are trimmed. Rejects empty fields, unusable destinations
	/// and a `from` pattern that already has a rule.
	pub fn add_rule(&mut self, from: &str, to: &str) -> Result<&Rule> {
		let rule = Rule::new(from, to);
		rule.validate(self.file.rules.len())?;

		if !is_valid_destination(&rule.to) {
			return Err(RedirectorError::InvalidDestination {
				destination: rule.to,
			});
		}

		if self.file.rules.iter().any(|r| r.from == rule.from) {
			return Err(RedirectorError::DuplicateRule { from: rule.from });
		}

		let mut updated = self.file.clone();
		updated.rules.push(rule);
		self.persist(updated)?;

		let index = self.file.rules.len() - 1;
		Ok(&self.file.rules[index])
	}

	/// Remove the rule at `index` (0-based), then save.
	pub fn remove_rule(&mut self, index: usize) -> Result<Rule> {
		let len = self.file.rules.len();
		if index >= len {
			return Err(RedirectorError::RuleIndexOutOfRange { index, len });
		}

		let mut updated = self.file.clone();
		let removed = updated.rules.remove(index);
		self.persist(updated)?;
		Ok(removed)
	}

	/// Write the rule list back to disk, creating parent directories.
	pub fn save(&mut self) -> Result<()> {
		self.persist(self.file.clone())
	}

	/// Write `file` to disk and adopt it. On error the store keeps its
	/// previous rules.
	fn persist(&mut self, file: RulesFile) -> Result<()> {
		let content = to_toml_string(&file)?;

		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent).map_err(|source| RedirectorError::RulesWriteError {
				path: self.path.clone(),
				source,
			})?;
		}

		std::fs::write(&self.path, content).map_err(|source| {
			RedirectorError::RulesWriteError {
				path: self.path.clone(),
				source,
			}
		})?;

		self.file = file;
		self.modified = modified_time(&self.path);
		self.version += 1;
		info!(
			path = %self.path.display(),
			rules = self.file.rules.len(),
			version = self.version,
			"Redirect rules saved"
		);
		Ok(())
	}
}

fn modified_time(path: &Path) -> Option<SystemTime> {
	std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
