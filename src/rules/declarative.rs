//! Export of compiled rules as browser declarative redirect rules.
//!
//! Produces the JSON accepted by `declarativeNetRequest.updateDynamicRules`
//! so the same rule list can be installed for native request interception.

use crate::error::Result;
use crate::rules::compiler::{CompiledRule, escape_regex_literal};
use serde::Serialize;

const RESOURCE_TYPES: [&str; 2] = ["main_frame", "sub_frame"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarativeRule {
	pub id: usize,
	pub priority: u32,
	pub action: Action,
	pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
	#[serde(rename = "type")]
	pub action_type: &'static str,
	pub redirect: Redirect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Redirect {
	#[serde(rename = "url")]
	Url(String),
	RegexSubstitution(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url_filter: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub regex_filter: Option<String>,

	pub resource_types: Vec<&'static str>,
}

impl DeclarativeRule {
	/// Translate the compiled rule at `index` (ids start at 1).
	pub fn from_compiled(index: usize, rule: &CompiledRule) -> Self {
		let (url_filter, regex_filter, redirect) = match rule {
			CompiledRule::Exact {
				literal,
				destination,
			} => (Some(literal.clone()), None, Redirect::Url(destination.clone())),
			CompiledRule::Wildcard {
				pattern,
				destination,
			} => (
				Some(pattern.as_str().to_string()),
				None,
				Redirect::Url(destination.clone()),
			),
			CompiledRule::PrefixCapture {
				prefix,
				destination_prefix,
			} => (
				None,
				Some(prefix_regex_filter(prefix)),
				Redirect::RegexSubstitution(format!("{destination_prefix}\\1")),
			),
		};

		DeclarativeRule {
			id: index + 1,
			priority: 1,
			action: Action {
				action_type: "redirect",
				redirect,
			},
			condition: Condition {
				url_filter,
				regex_filter,
				resource_types: RESOURCE_TYPES.to_vec(),
			},
		}
	}
}

/// Anchored regex capturing everything after a literal prefix.
pub fn prefix_regex_filter(prefix: &str) -> String {
	format!("^{}(.*)$", escape_regex_literal(prefix))
}

/// Translate a compiled rule list, preserving order.
pub fn to_declarative(rules: &[CompiledRule]) -> Vec<DeclarativeRule> {
	rules
		.iter()
		.enumerate()
		.map(|(i, rule)| DeclarativeRule::from_compiled(i, rule))
		.collect()
}

/// Render a compiled rule list as pretty-printed JSON.
pub fn export_json(rules: &[CompiledRule]) -> Result<String> {
	Ok(serde_json::to_string_pretty(&to_declarative(rules))?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::Rule;
	use crate::rules::compiler::compile_rules;
	use regex::Regex;

	fn compiled(pairs: &[(&str, &str)]) -> Vec<CompiledRule> {
		let rules: Vec<Rule> = pairs
			.iter()
			.map(|(from, to)| Rule {
				from: from.to_string(),
				to: to.to_string(),
			})
			.collect();
		compile_rules(&rules)
	}

	#[test]
	fn test_prefix_rule_uses_regex_substitution() {
		let rules = compiled(&[("https://example.com/a+b", "https://example.org/c")]);
		let exported = to_declarative(&rules);

		assert_eq!(exported[0].id, 1);
		assert_eq!(
			exported[0].condition.regex_filter.as_deref(),
			Some(r"^https://example\.com/a\+b(.*)$")
		);
		assert_eq!(exported[0].condition.url_filter, None);
		assert_eq!(
			exported[0].action.redirect,
			Redirect::RegexSubstitution(r"https://example.org/c\1".to_string())
		);
	}

	#[test]
	fn test_prefix_regex_filter_agrees_with_matcher() {
		let filter = Regex::new(&prefix_regex_filter("https://example.com/a+b")).unwrap();

		let caps = filter.captures("https://example.com/a+b/more").unwrap();
		assert_eq!(&caps[1], "/more");
		assert!(!filter.is_match("https://example.com/abb/more"));
	}

	#[test]
	fn test_exact_and_wildcard_use_url_filter() {
		let rules = compiled(&[
			("https://a.example/x.html", "https://b.example/y.html"),
			("https://*.example.com/*", "https://example.org/"),
		]);
		let exported = to_declarative(&rules);

		assert_eq!(exported[0].id, 1);
		assert_eq!(
			exported[0].condition.url_filter.as_deref(),
			Some("https://a.example/x.html")
		);
		assert_eq!(exported[1].id, 2);
		assert_eq!(
			exported[1].condition.url_filter.as_deref(),
			Some("https://*.example.com/*")
		);
		assert_eq!(
			exported[1].action.redirect,
			Redirect::Url("https://example.org/".to_string())
		);
	}

	#[test]
	fn test_export_json_shape() {
		let rules = compiled(&[("https://old.example.com", "https://new.example.com")]);
		let json = export_json(&rules).unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();

		assert_eq!(value[0]["id"], 1);
		assert_eq!(value[0]["priority"], 1);
		assert_eq!(value[0]["action"]["type"], "redirect");
		assert_eq!(
			value[0]["action"]["redirect"]["regexSubstitution"],
			r"https://new.example.com\1"
		);
		assert_eq!(
			value[0]["condition"]["resourceTypes"],
			serde_json::json!(["main_frame", "sub_frame"])
		);
		assert!(value[0]["condition"].get("urlFilter").is_none());
	}

	#[test]
	fn test_export_empty_list() {
		assert_eq!(export_json(&[]).unwrap(), "[]");
	}
}
