//! First-match-wins evaluation of a URL against compiled rules.

use crate::rules::compiler::CompiledRule;

/// Outcome of evaluating a URL against a rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
	NoMatch,
	Redirect { destination: String },
}

impl MatchResult {
	/// The destination URL, if a rule matched.
	pub fn destination(&self) -> Option<&str> {
		match self {
			MatchResult::NoMatch => None,
			MatchResult::Redirect { destination } => Some(destination),
		}
	}
}

/// The rule that won an evaluation.
#[derive(Debug)]
pub struct Match<'a> {
	/// Position of the rule in the list.
	pub index: usize,

	/// The matching rule.
	pub rule: &'a CompiledRule,

	/// The rewritten URL.
	pub destination: String,
}

/// Find the first rule matching `url`. Later rules are not evaluated.
pub fn find_match<'a>(url: &str, rules: &'a [CompiledRule]) -> Option<Match<'a>> {
	rules.iter().enumerate().find_map(|(index, rule)| {
		rule.apply(url).map(|destination| Match {
			index,
			rule,
			destination,
		})
	})
}

/// Evaluate `url` against `rules` in order; the first match wins.
pub fn match_url(url: &str, rules: &[CompiledRule]) -> MatchResult {
	match find_match(url, rules) {
		Some(m) => MatchResult::Redirect {
			destination: m.destination,
		},
		None => MatchResult::NoMatch,
	}
}
