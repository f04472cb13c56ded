//! Rule storage for url-redirector.
//!
//! This module handles:
//! - TOML rules file parsing and serialization
//! - Rules file location
//! - Rule editing with validation and versioning

pub mod parser;
pub mod store;
pub mod types;

pub use parser::{parse_rules_file, parse_rules_str, to_toml_string};
pub use store::{
	RULES_PATH_ENV_VAR, RuleStore, default_rules_path, is_valid_destination, resolve_rules_path,
};
pub use types::{Rule, RulesFile};
