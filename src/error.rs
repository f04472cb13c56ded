use std::path::PathBuf;

/// Library-level structured errors for url-redirector.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
///
/// The rule engine itself never fails; these cover rule storage and editing.
#[derive(Debug, thiserror::Error)]
pub enum RedirectorError {
	#[error("Failed to read rules file: {path}")]
	RulesReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write rules file: {path}")]
	RulesWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse rules file: {path}")]
	RulesParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to serialize rules")]
	RulesSerializeError(#[from] toml::ser::Error),

	#[error("Failed to serialize declarative rules")]
	ExportError(#[from] serde_json::Error),

	#[error("Rule {index} has an empty `{field}` field")]
	EmptyField { index: usize, field: &'static str },

	#[error("Invalid destination URL: {destination}")]
	InvalidDestination { destination: String },

	#[error("A rule with this pattern already exists: {from}")]
	DuplicateRule { from: String },

	#[error("No rule at position {index} (rule list has {len} rules)")]
	RuleIndexOutOfRange { index: usize, len: usize },

	#[error("Failed to resolve config directory")]
	ConfigDirectoryNotFound,
}

/// Result type alias using RedirectorError.
pub type Result<T> = std::result::Result<T, RedirectorError>;
