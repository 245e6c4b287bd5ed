//! Configuration validation functions

use super::ValidationError;
use crate::exclusion::PatternMatcher;

/// Smallest accepted hashing buffer
pub const MIN_HASH_BUFFER: usize = 1024;

/// Largest accepted hashing buffer
pub const MAX_HASH_BUFFER: usize = 64 * 1024 * 1024;

/// Validate the hashing read buffer size in bytes
pub fn validate_hash_buffer_size(size: usize) -> Result<(), ValidationError> {
	if size < MIN_HASH_BUFFER {
		return Err(ValidationError::ConfigError(format!(
			"hashBufferSize must be at least {}, got {}",
			MIN_HASH_BUFFER, size
		)));
	}
	if size > MAX_HASH_BUFFER {
		return Err(ValidationError::ConfigError(format!(
			"hashBufferSize must be at most {}, got {}",
			MAX_HASH_BUFFER, size
		)));
	}
	Ok(())
}

/// Validate the hidden-file prefix
///
/// An empty prefix would hide every file; a separator could never match a
/// leaf name.
pub fn validate_hidden_prefix(prefix: &str) -> Result<(), ValidationError> {
	if prefix.is_empty() {
		return Err(ValidationError::ConfigError(
			"hiddenPrefix must not be empty (use skipHidden = false instead)".to_string(),
		));
	}
	if prefix.contains('/') || prefix.contains('\\') {
		return Err(ValidationError::ConfigError(format!(
			"hiddenPrefix must not contain path separators, got {:?}",
			prefix
		)));
	}
	Ok(())
}

/// Validate every exclusion glob
pub fn validate_patterns(patterns: &[String]) -> Result<(), ValidationError> {
	for pattern in patterns {
		PatternMatcher::check_pattern(pattern)
			.map_err(|e| ValidationError::ConfigError(e.to_string()))?;
	}
	Ok(())
}

/// Validate a tracing level name
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
	match level.to_lowercase().as_str() {
		"trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
		_ => Err(ValidationError::ConfigError(format!(
			"Unknown log level: {}. Valid options: trace, debug, info, warn, error, off",
			level
		))),
	}
}


// vim: ts=4
