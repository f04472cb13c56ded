//! URL observation session.
//!
//! Tracks the last observed URL and evaluates a new one only when it
//! actually changed, the way a page watcher reacts to navigation events.

use crate::config::types::Rule;
use crate::rules::{CompiledRule, compile_rules, find_match};
use tracing::{debug, info};

/// A redirect decided for an observed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	/// Index of the rule that matched.
	pub rule_index: usize,

	/// URL to navigate to.
	pub destination: String,
}

/// Compiled rules plus the state of one URL stream.
#[derive(Debug, Default)]
pub struct Session {
	rules: Vec<CompiledRule>,
	version: u64,
	current_url: Option<String>,
}

impl Session {
	/// Start a session with an initial rule list.
	pub fn new(rules: &[Rule], version: u64) -> Self {
		Session {
			rules: compile_rules(rules),
			version,
			current_url: None,
		}
	}

	/// Recompile the whole rule list for a new version.
	pub fn replace_rules(&mut self, rules: &[Rule], version: u64) {
		self.rules = compile_rules(rules);
		self.version = version;
		debug!(version, rules = self.rules.len(), "Session rules replaced");
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn rules(&self) -> &[CompiledRule] {
		&self.rules
	}

	/// Observe a URL.
	///
	/// Returns `None` when the URL equals the previously observed one, when
	/// no rule matches, or when the destination is the URL itself.
	pub fn observe(&mut self, url: &str) -> Option<Redirect> {
		if self.current_url.as_deref() == Some(url) {
			return None;
		}
		self.current_url = Some(url.to_string());

		let m = find_match(url, &self.rules)?;
		if m.destination == url {
			debug!(url, rule = m.index, "Ignoring redirect to the same URL");
			return None;
		}

		info!(from = url, to = %m.destination, rule = m.index, "Redirecting");
		Some(Redirect {
			rule_index: m.index,
			destination: m.destination,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rules() -> Vec<Rule> {
		vec![
			Rule::new("https://www.google.com/search", "https://duckduckgo.com/"),
			Rule::new("https://loop.example/", "https://loop.example/"),
		]
	}

	#[test]
	fn test_observe_redirects() {
		let mut session = Session::new(&rules(), 1);
		let redirect = session
			.observe("https://www.google.com/search?q=cats")
			.unwrap();
		assert_eq!(redirect.rule_index, 0);
		assert_eq!(redirect.destination, "https://duckduckgo.com/?q=cats");
	}

	#[test]
	fn test_observe_same_url_twice() {
		let mut session = Session::new(&rules(), 1);
		assert!(session.observe("https://www.google.com/search?q=1").is_some());
		assert!(session.observe("https://www.google.com/search?q=1").is_none());
		assert!(session.observe("https://www.google.com/search?q=2").is_some());
	}

	#[test]
	fn test_observe_no_match() {
		let mut session = Session::new(&rules(), 1);
		assert_eq!(session.observe("https://example.org/"), None);
	}

	#[test]
	fn test_observe_skips_self_redirect() {
		let mut session = Session::new(&rules(), 1);
		assert_eq!(session.observe("https://loop.example/"), None);
		// The remainder is preserved, so deeper paths map onto themselves too
		assert_eq!(session.observe("https://loop.example/a"), None);
	}

	#[test]
	fn test_replace_rules() {
		let mut session = Session::new(&[], 1);
		assert_eq!(session.observe("https://old.example.com/x"), None);

		session.replace_rules(
			&[Rule::new("https://old.example.com", "https://new.example.com")],
			2,
		);
		assert_eq!(session.version(), 2);
		assert_eq!(session.rules().len(), 1);

		let redirect = session.observe("https://old.example.com/y").unwrap();
		assert_eq!(redirect.destination, "https://new.example.com/y");
	}
}
