//! url-redirector - rewrite URLs with user-authored redirect rules.
//!
//! This library provides the core functionality for url-redirector, including:
//! - Rule classification (exact, wildcard, prefix) and compilation
//! - First-match-wins URL evaluation with suffix preservation
//! - TOML rule storage with validated editing
//! - Export as browser declarative redirect rules
//!
//! # Example
//!
//! ```
//! use url_redirector::config::Rule;
//! use url_redirector::rules::{MatchResult, compile_rules, match_url};
//!
//! let rules = compile_rules(&[Rule::new(
//!     "https://www.google.com/search",
//!     "https://duckduckgo.com/search",
//! )]);
//!
//! assert_eq!(
//!     match_url("https://www.google.com/search?q=cats", &rules),
//!     MatchResult::Redirect {
//!         destination: "https://duckduckgo.com/search?q=cats".to_string()
//!     }
//! );
//! ```

pub mod config;
pub mod error;
pub mod rules;
pub mod session;

pub use error::{RedirectorError, Result};
