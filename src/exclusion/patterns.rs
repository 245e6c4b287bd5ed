//! Pattern-based exclusion using glob patterns

use super::ExclusionError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Pattern matcher using globset for efficient matching
///
/// Patterns are matched against paths relative to the tree root. `*` also
/// crosses directory separators, so `*.log` matches at any depth.
pub struct PatternMatcher {
	/// Compiled exclusion patterns
	exclude_set: GlobSet,

	/// Compiled inclusion patterns (override exclusions)
	include_set: Option<GlobSet>,
}

impl PatternMatcher {
	/// Create a new pattern matcher
	pub fn new(
		exclude_patterns: &[String],
		include_patterns: &[String],
	) -> Result<Self, ExclusionError> {
		let exclude_set = Self::build_glob_set(exclude_patterns)?;

		let include_set = if !include_patterns.is_empty() {
			Some(Self::build_glob_set(include_patterns)?)
		} else {
			None
		};

		Ok(Self { exclude_set, include_set })
	}

	/// Matcher that excludes nothing
	pub fn empty() -> Self {
		Self { exclude_set: GlobSet::empty(), include_set: None }
	}

	/// Compile a single pattern, reporting the pattern text on failure
	pub fn check_pattern(pattern: &str) -> Result<(), ExclusionError> {
		Glob::new(pattern)
			.map(|_| ())
			.map_err(|e| ExclusionError::InvalidPattern(format!("{}: {}", pattern, e)))
	}

	fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ExclusionError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = Glob::new(pattern)
				.map_err(|e| ExclusionError::InvalidPattern(format!("{}: {}", pattern, e)))?;
			builder.add(glob);
		}

		builder.build().map_err(|e| {
			ExclusionError::InvalidPattern(format!("Failed to build pattern set: {}", e))
		})
	}

	/// Check if a path is excluded by any pattern
	pub fn is_excluded(&self, path: &Path) -> bool {
		if let Some(ref include_set) = self.include_set {
			if include_set.is_match(path) {
				return false;
			}
		}

		self.exclude_set.is_match(path)
	}
}


// vim: ts=4
