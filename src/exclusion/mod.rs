//! Exclusion and filtering system
//!
//! Decides which tree entries the reconciler compares at all. An excluded
//! entry is neither copied nor deleted; it is invisible to both passes.
//!
//! The default rule skips hidden files (leaf name starting with `.`). Glob
//! patterns and arbitrary predicates can be layered on top through
//! [`ExclusionEngine`].

mod patterns;

pub use patterns::PatternMatcher;

use crate::file_ops;
use crate::types::TreeEntry;

/// Predicate over tree entries; `true` removes the entry from comparison
pub trait EntryFilter: Send + Sync {
	fn is_excluded(&self, entry: &TreeEntry) -> bool;
}

impl<F: Fn(&TreeEntry) -> bool + Send + Sync> EntryFilter for F {
	fn is_excluded(&self, entry: &TreeEntry) -> bool {
		self(entry)
	}
}

/// Excludes files whose leaf name starts with a marker prefix
///
/// Directories are never matched, so a hidden directory is still mirrored.
#[derive(Debug, Clone)]
pub struct HiddenFileFilter {
	prefix: String,
}

impl HiddenFileFilter {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}
}

impl Default for HiddenFileFilter {
	fn default() -> Self {
		Self::new(".")
	}
}

impl EntryFilter for HiddenFileFilter {
	fn is_excluded(&self, entry: &TreeEntry) -> bool {
		!entry.is_dir() && entry.name().starts_with(&self.prefix)
	}
}

/// Exclusion settings as they come from configuration
#[derive(Debug, Clone)]
pub struct ExcludeConfig {
	pub patterns: Vec<String>,
	pub include_patterns: Vec<String>,
	pub skip_hidden: bool,
	pub hidden_prefix: String,
}

impl Default for ExcludeConfig {
	fn default() -> Self {
		Self {
			patterns: vec![],
			include_patterns: vec![],
			skip_hidden: true,
			hidden_prefix: ".".to_string(),
		}
	}
}

/// Combined exclusion engine that applies all configured filters
pub struct ExclusionEngine {
	pattern_matcher: PatternMatcher,
	filters: Vec<Box<dyn EntryFilter>>,
}

impl ExclusionEngine {
	/// Create a new exclusion engine from configuration
	pub fn new(config: &ExcludeConfig) -> Result<Self, ExclusionError> {
		let pattern_matcher = PatternMatcher::new(&config.patterns, &config.include_patterns)?;

		let mut filters: Vec<Box<dyn EntryFilter>> = Vec::new();
		if config.skip_hidden {
			filters.push(Box::new(HiddenFileFilter::new(config.hidden_prefix.clone())));
		}

		Ok(Self { pattern_matcher, filters })
	}

	/// Add a custom predicate, evaluated after the built-in rules
	pub fn with_filter(mut self, filter: Box<dyn EntryFilter>) -> Self {
		self.filters.push(filter);
		self
	}

	/// Check if an entry should be left out of both passes
	pub fn should_exclude(&self, entry: &TreeEntry) -> bool {
		// In-flight copies are never compared, whatever the hidden rule says
		if !entry.is_dir() && file_ops::is_temp_name(entry.name()) {
			return true;
		}

		if self.pattern_matcher.is_excluded(&entry.relative_path) {
			return true;
		}

		self.filters.iter().any(|f| f.is_excluded(entry))
	}
}

impl Default for ExclusionEngine {
	fn default() -> Self {
		Self {
			pattern_matcher: PatternMatcher::empty(),
			filters: vec![Box::new(HiddenFileFilter::default())],
		}
	}
}

impl EntryFilter for ExclusionEngine {
	fn is_excluded(&self, entry: &TreeEntry) -> bool {
		self.should_exclude(entry)
	}
}

/// Errors that can occur during exclusion processing
#[derive(Debug)]
pub enum ExclusionError {
	/// Failed to parse a glob pattern
	InvalidPattern(String),
}

impl std::fmt::Display for ExclusionError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExclusionError::InvalidPattern(msg) => {
				write!(f, "Invalid exclusion pattern: {}", msg)
			}
		}
	}
}

impl std::error::Error for ExclusionError {}


// vim: ts=4
