//! Rule compilation and URL matching for url-redirector.
//!
//! This module handles:
//! - Classifying `from` patterns as exact, wildcard or prefix
//! - Compiling rules into matchers
//! - First-match-wins evaluation of a URL
//! - Export as browser declarative redirect rules

pub mod classify;
pub mod compiler;
pub mod declarative;
pub mod matcher;

pub use classify::{Classification, PatternKind, classify, explain};
pub use compiler::{CompiledRule, WildcardPattern, compile, compile_rules, escape_regex_literal};
pub use declarative::{DeclarativeRule, export_json, to_declarative};
pub use matcher::{Match, MatchResult, find_match, match_url};
