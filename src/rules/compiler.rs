//! Rule compilation: `from`/`to` pairs into exact, wildcard or prefix
//! matchers.

use crate::config::types::Rule;
use crate::rules::classify::{PatternKind, classify};
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

/// A rule compiled into the matcher its `from` pattern calls for.
///
/// Classification depends on `from` alone, so equal rules always compile to
/// equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledRule {
	/// Character-for-character match; the destination is used unchanged.
	Exact { literal: String, destination: String },

	/// Anchored glob where `*` matches any sequence; the destination is used
	/// unchanged.
	Wildcard {
		pattern: WildcardPattern,
		destination: String,
	},

	/// Literal prefix; the rest of the URL is appended to the destination.
	PrefixCapture {
		prefix: String,
		destination_prefix: String,
	},
}

impl CompiledRule {
	pub fn kind(&self) -> PatternKind {
		match self {
			CompiledRule::Exact { .. } => PatternKind::Exact,
			CompiledRule::Wildcard { .. } => PatternKind::Wildcard,
			CompiledRule::PrefixCapture { .. } => PatternKind::Prefix,
		}
	}

	/// Apply this rule to `url`, returning the rewritten destination.
	pub fn apply(&self, url: &str) -> Option<String> {
		match self {
			CompiledRule::Exact {
				literal,
				destination,
			} => (url == literal.as_str()).then(|| destination.clone()),
			CompiledRule::Wildcard {
				pattern,
				destination,
			} => pattern.is_match(url).then(|| destination.clone()),
			CompiledRule::PrefixCapture {
				prefix,
				destination_prefix,
			} => url
				.strip_prefix(prefix.as_str())
				.map(|rest| format!("{destination_prefix}{rest}")),
		}
	}
}

/// A `*` glob translated into an anchored regex.
///
/// Every character other than `*` matches literally. A `*` inside the scheme
/// or host of a glob that goes on to a path stops at `/`, so a host wildcard
/// cannot swallow a path that happens to embed the expected host. Any other
/// `*` matches anything.
#[derive(Clone)]
pub struct WildcardPattern {
	source: String,
	regex: Regex,
}

impl WildcardPattern {
	/// Translate and compile a glob.
	pub fn new(glob: &str) -> std::result::Result<Self, regex::Error> {
		Ok(WildcardPattern {
			source: glob.to_string(),
			regex: Regex::new(&glob_to_regex(glob))?,
		})
	}

	/// The glob as written in the rule.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn is_match(&self, url: &str) -> bool {
		self.regex.is_match(url)
	}
}

impl PartialEq for WildcardPattern {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for WildcardPattern {}

impl fmt::Debug for WildcardPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("WildcardPattern").field(&self.source).finish()
	}
}

impl fmt::Display for WildcardPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

/// Compile one rule. Never fails: a wildcard the regex engine rejects is
/// matched exactly instead.
pub fn compile(rule: &Rule) -> CompiledRule {
	match classify(&rule.from) {
		PatternKind::Wildcard => match WildcardPattern::new(&rule.from) {
			Ok(pattern) => {
				debug!(from = %rule.from, to = %rule.to, "Creating wildcard rule");
				CompiledRule::Wildcard {
					pattern,
					destination: rule.to.clone(),
				}
			}
			Err(error) => {
				warn!(from = %rule.from, %error, "Wildcard pattern rejected, matching exactly");
				exact(rule)
			}
		},
		PatternKind::Prefix => {
			debug!(from = %rule.from, to = %rule.to, "Creating prefix rule");
			CompiledRule::PrefixCapture {
				prefix: rule.from.clone(),
				destination_prefix: rule.to.clone(),
			}
		}
		PatternKind::Exact => {
			debug!(from = %rule.from, to = %rule.to, "Creating exact rule");
			exact(rule)
		}
	}
}

fn exact(rule: &Rule) -> CompiledRule {
	CompiledRule::Exact {
		literal: rule.from.clone(),
		destination: rule.to.clone(),
	}
}

/// Compile a whole rule list, preserving order.
pub fn compile_rules(rules: &[Rule]) -> Vec<CompiledRule> {
	rules.iter().map(compile).collect()
}

/// Escape the characters that are special in a regex literal:
/// `. * + ? ^ $ { } ( ) | [ ] \`.
///
/// Narrower than [`regex::escape`] on purpose: the output is also consumed by
/// browser regex filters, which reject escapes of ordinary characters.
pub fn escape_regex_literal(literal: &str) -> String {
	let mut escaped = String::with_capacity(literal.len());
	for c in literal.chars() {
		if matches!(
			c,
			'.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
		) {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

/// Build the anchored regex for a glob.
fn glob_to_regex(glob: &str) -> String {
	// Stars before this offset sit in the scheme or host. Without a path
	// there is nothing to protect, so every star stays unrestricted.
	let host_end = glob.find("://").and_then(|i| {
		let rest = i + 3;
		glob[rest..].find('/').map(|j| rest + j)
	});

	let mut out = String::from("(?s)^");
	let mut literal_start = 0;
	for (i, _) in glob.match_indices('*') {
		out.push_str(&escape_regex_literal(&glob[literal_start..i]));
		if host_end.is_some_and(|end| i < end) {
			out.push_str("[^/]*");
		} else {
			out.push_str(".*");
		}
		literal_start = i + 1;
	}
	out.push_str(&escape_regex_literal(&glob[literal_start..]));
	out.push('$');
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rule(from: &str, to: &str) -> Rule {
		Rule {
			from: from.to_string(),
			to: to.to_string(),
		}
	}

	#[test]
	fn test_compile_exact() {
		let compiled = compile(&rule("https://a.example/x.html", "https://b.example/y.html"));
		assert_eq!(
			compiled,
			CompiledRule::Exact {
				literal: "https://a.example/x.html".to_string(),
				destination: "https://b.example/y.html".to_string(),
			}
		);
	}

	#[test]
	fn test_compile_prefix() {
		let compiled = compile(&rule(
			"https://www.google.com/search",
			"https://duckduckgo.com/search",
		));
		assert_eq!(
			compiled,
			CompiledRule::PrefixCapture {
				prefix: "https://www.google.com/search".to_string(),
				destination_prefix: "https://duckduckgo.com/search".to_string(),
			}
		);
	}

	#[test]
	fn test_compile_wildcard_keeps_pattern_verbatim() {
		let compiled = compile(&rule("https://*.example.com/*", "https://example.org/"));
		match compiled {
			CompiledRule::Wildcard {
				pattern,
				destination,
			} => {
				assert_eq!(pattern.as_str(), "https://*.example.com/*");
				assert_eq!(destination, "https://example.org/");
			}
			other => panic!("Expected Wildcard, got {other:?}"),
		}
	}

	#[test]
	fn test_compile_is_deterministic() {
		for from in [
			"https://a.example/x.html",
			"https://old.example.com",
			"https://*.example.com/*",
			"https://example.com/a+b",
		] {
			let r = rule(from, "https://dest.example/");
			assert_eq!(compile(&r), compile(&r));
		}
	}

	#[test]
	fn test_compile_rules_preserves_order() {
		let rules = vec![
			rule("https://a.example/x.html", "https://b.example/"),
			rule("https://*.example.com/*", "https://c.example/"),
			rule("https://old.example.com", "https://new.example.com"),
		];
		let kinds: Vec<_> = compile_rules(&rules).iter().map(|r| r.kind()).collect();
		assert_eq!(
			kinds,
			vec![PatternKind::Exact, PatternKind::Wildcard, PatternKind::Prefix]
		);
	}

	#[test]
	fn test_escape_regex_literal() {
		assert_eq!(escape_regex_literal("a+b"), r"a\+b");
		assert_eq!(
			escape_regex_literal(r".*+?^${}()|[]\"),
			r"\.\*\+\?\^\$\{\}\(\)\|\[\]\\"
		);
		// Characters outside the set are left alone
		assert_eq!(escape_regex_literal("a-b/c#d&e"), "a-b/c#d&e");
	}

	#[test]
	fn test_escaped_literal_matches_literally() {
		let re = Regex::new(&format!("^{}$", escape_regex_literal("https://example.com/a+b"))).unwrap();
		assert!(re.is_match("https://example.com/a+b"));
		assert!(!re.is_match("https://example.com/abbb"));
		assert!(!re.is_match("https://exampleXcom/a+b"));
	}

	#[test]
	fn test_glob_to_regex() {
		assert_eq!(
			glob_to_regex("https://*.example.com/*"),
			r"(?s)^https://[^/]*\.example\.com/.*$"
		);
		assert_eq!(glob_to_regex("*"), "(?s)^.*$");
		assert_eq!(glob_to_regex("*://example.com/"), r"(?s)^[^/]*://example\.com/$");
		// No path after the host: the star is unrestricted
		assert_eq!(glob_to_regex("*://example.com"), r"(?s)^.*://example\.com$");
		assert_eq!(glob_to_regex("https://*"), "(?s)^https://.*$");
	}

	#[test]
	fn test_wildcard_pattern_matches_full_string() {
		let p = WildcardPattern::new("https://example.com/*.html").unwrap();
		assert!(p.is_match("https://example.com/a.html"));
		assert!(p.is_match("https://example.com/a/b.html"));
		assert!(p.is_match("https://example.com/.html"));
		assert!(!p.is_match("https://example.com/a.html?x=1"));
		assert!(!p.is_match("xhttps://example.com/a.html"));
	}

	#[test]
	fn test_trailing_host_wildcard_crosses_slashes() {
		let p = WildcardPattern::new("https://*").unwrap();
		assert!(p.is_match("https://example.com/page"));
		assert!(p.is_match("https://"));

		let p = WildcardPattern::new("https://example.com*").unwrap();
		assert!(p.is_match("https://example.com/page"));
		assert!(p.is_match("https://example.com.evil.test/"));

		let p = WildcardPattern::new("https://example.com?q=*").unwrap();
		assert!(p.is_match("https://example.com?q=a/b"));
	}

	#[test]
	fn test_host_wildcard_before_path_stops_at_slash() {
		let p = WildcardPattern::new("https://*.example.com/*").unwrap();
		assert!(p.is_match("https://sub.example.com/page"));
		assert!(p.is_match("https://a.b.example.com/x/y"));
		assert!(!p.is_match("https://evil.com/https://sub.example.com/page"));
	}

	#[test]
	fn test_wildcard_dot_is_literal() {
		let p = WildcardPattern::new("https://example.com/a.b*").unwrap();
		assert!(p.is_match("https://example.com/a.bc"));
		assert!(!p.is_match("https://example.com/aXbc"));
	}

	#[test]
	fn test_apply_prefix_empty_remainder() {
		let compiled = compile(&rule("https://old.example.com", "https://new.example.com"));
		assert_eq!(
			compiled.apply("https://old.example.com"),
			Some("https://new.example.com".to_string())
		);
	}
}
