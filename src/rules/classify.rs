//! Pattern classification shared by the compiler and the advisory commands.
//!
//! Which matcher a rule gets is inferred from the surface syntax of its
//! `from` pattern. Heuristic A's extension check looks at the final path
//! segment only, and heuristic B's dot check at the text after the last
//! `/`, so the host's own dots (`www.google.com`) never turn a path into an
//! exact match.

use std::fmt;

/// The matching strategy chosen for a `from` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
	Exact,
	Wildcard,
	Prefix,
}

impl PatternKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			PatternKind::Exact => "exact",
			PatternKind::Wildcard => "wildcard",
			PatternKind::Prefix => "prefix",
		}
	}
}

impl fmt::Display for PatternKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Every predicate that went into a classification, for advisory output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
	/// The resulting strategy.
	pub kind: PatternKind,

	/// The pattern contains a `*`.
	pub has_wildcard: bool,

	/// Heuristic A: no query, no fragment, no file extension, and either a
	/// trailing slash or no path at all.
	pub likely_prefix: bool,

	/// Heuristic B: non-empty text after the last `/`, without any `.`.
	pub ends_with_path_segment: bool,

	/// Exact match caused by a `.` in the final path segment that is not a
	/// file extension (`/v1.2-beta`). Usually not what the author meant.
	pub dotted_segment_matched_exactly: bool,
}

/// Classify a `from` pattern.
pub fn classify(from: &str) -> PatternKind {
	if from.contains('*') {
		PatternKind::Wildcard
	} else if is_likely_prefix(from) || ends_with_path_segment(from) {
		PatternKind::Prefix
	} else {
		PatternKind::Exact
	}
}

/// Classify a `from` pattern and keep the individual predicates.
pub fn explain(from: &str) -> Classification {
	let kind = classify(from);

	Classification {
		kind,
		has_wildcard: from.contains('*'),
		likely_prefix: is_likely_prefix(from),
		ends_with_path_segment: ends_with_path_segment(from),
		dotted_segment_matched_exactly: kind == PatternKind::Exact
			&& final_path_segment(from)
				.is_some_and(|s| s.contains('.') && !has_file_extension(s)),
	}
}

/// Heuristic A ("likely prefix").
pub fn is_likely_prefix(from: &str) -> bool {
	!from.contains('?')
		&& !from.contains('#')
		&& !final_path_segment(from).is_some_and(has_file_extension)
		&& (from.ends_with('/') || path(from).is_none())
}

/// Heuristic B ("ends with bare path segment").
///
/// Looks at the text after the last `/` of the whole pattern, so a
/// scheme+host pattern is judged on its host (`http://localhost?x=1`).
pub fn ends_with_path_segment(from: &str) -> bool {
	last_segment(from).is_some_and(|s| !s.is_empty() && !s.contains('.'))
}

/// True when `segment` ends with `.` followed by one or more ASCII
/// alphanumerics.
fn has_file_extension(segment: &str) -> bool {
	let stem = segment.trim_end_matches(|c: char| c.is_ascii_alphanumeric());
	stem.len() < segment.len() && stem.ends_with('.')
}

/// Text after the last `/`, or `None` when there is no `/` at all.
fn last_segment(from: &str) -> Option<&str> {
	from.rfind('/').map(|i| &from[i + 1..])
}

/// Text after the last `/` of the path, or `None` when there is no path.
fn final_path_segment(from: &str) -> Option<&str> {
	path(from).map(|p| p.rsplit('/').next().unwrap_or(p))
}

/// The path part of a pattern: everything from the first `/` after the
/// scheme separator. `None` for scheme+host patterns.
fn path(from: &str) -> Option<&str> {
	let rest = after_scheme(from);
	rest.find('/').map(|i| &rest[i..])
}

/// Text following the scheme separator.
///
/// Without a `://` the search starts at the third character, so a leading
/// `/` or `./` never counts as a path.
fn after_scheme(from: &str) -> &str {
	match from.find("://") {
		Some(i) => &from[i + 3..],
		None => from.char_indices().nth(2).map_or("", |(i, _)| &from[i..]),
	}
}
