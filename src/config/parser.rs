//! Reading and writing the TOML rules file.

use crate::config::types::RulesFile;
use crate::error::{RedirectorError, Result};
use std::path::Path;
use tracing::debug;

/// Parse a rules file from the given path.
///
/// A missing file is an empty rule list.
pub fn parse_rules_file(path: &Path) -> Result<RulesFile> {
	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
			debug!(path = %path.display(), "Rules file not found, using empty rule list");
			return Ok(RulesFile::default());
		}
		Err(source) => {
			return Err(RedirectorError::RulesReadError {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	parse_rules_str(&content, path)
}

/// Parse rules from a string (useful for testing).
pub fn parse_rules_str(content: &str, path: &Path) -> Result<RulesFile> {
	let file: RulesFile =
		toml::from_str(content).map_err(|source| RedirectorError::RulesParseError {
			path: path.to_path_buf(),
			source,
		})?;

	// Validate the parsed rules
	file.validate()?;

	Ok(file)
}

/// Serialize rules to TOML.
pub fn to_toml_string(file: &RulesFile) -> Result<String> {
	Ok(toml::to_string(file)?)
}
