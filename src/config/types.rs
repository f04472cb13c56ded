//! Serialized shape of the rules file.

use crate::error::RedirectorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level contents of a rules file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RulesFile {
	/// Redirect rules, evaluated in order. First matching rule wins.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A user-authored redirect rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rule {
	/// Source pattern: an exact URL, a URL prefix, or a `*` glob.
	pub from: String,

	/// Destination URL or, for prefix rules, destination prefix.
	pub to: String,
}

impl Rule {
	/// Build a rule from user input, trimming both fields.
	pub fn new(from: &str, to: &str) -> Self {
		Rule {
			from: from.trim().to_string(),
			to: to.trim().to_string(),
		}
	}

	/// Check that neither field is empty. `index` is used for reporting.
	pub fn validate(&self, index: usize) -> Result<(), RedirectorError> {
		if self.from.trim().is_empty() {
			return Err(RedirectorError::EmptyField {
				index,
				field: "from",
			});
		}
		if self.to.trim().is_empty() {
			return Err(RedirectorError::EmptyField { index, field: "to" });
		}
		Ok(())
	}
}

impl RulesFile {
	/// Validate all rules in this file.
	pub fn validate(&self) -> Result<(), RedirectorError> {
		for (index, rule) in self.rules.iter().enumerate() {
			rule.validate(index)?;
		}
		Ok(())
	}

	/// `from` patterns that appear more than once, in first-seen order.
	pub fn duplicate_sources(&self) -> Vec<&str> {
		let mut seen = HashSet::new();
		let mut duplicates = Vec::new();
		for rule in &self.rules {
			if !seen.insert(rule.from.as_str()) && !duplicates.contains(&rule.from.as_str()) {
				duplicates.push(rule.from.as_str());
			}
		}
		duplicates
	}
}
