//! Unified configuration for replicr
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (TOML, or JSON5/JSON by extension)
//! 3. Environment variables (REPLICR_* prefix)
//! 4. CLI flags (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::exclusion::ExcludeConfig;
use crate::hasher::HASH_BUFFER_SIZE;
use crate::strategies::{ErrorPolicy, KindMismatchPolicy};
use crate::validation::{self, ValidationError, Validator};

/// Configuration for mirroring operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	// ========================================================================
	// ROOTS & SCHEDULING
	// ========================================================================
	/// Authoritative tree
	pub source: Option<PathBuf>,

	/// Tree kept in agreement with the source
	pub replica: Option<PathBuf>,

	/// Seconds between the end of one pass and the start of the next
	pub interval_secs: u64,

	/// Append-only event log
	pub log_file: PathBuf,

	// ========================================================================
	// EXCLUSION
	// ========================================================================
	/// Glob patterns (relative to the roots) left out of both passes
	pub exclude_patterns: Vec<String>,

	/// Glob patterns that override exclusions
	pub include_patterns: Vec<String>,

	/// Skip files whose name starts with `hidden_prefix`
	pub skip_hidden: bool,

	/// Leaf-name prefix marking a hidden file
	pub hidden_prefix: String,

	// ========================================================================
	// SYNC BEHAVIOR
	// ========================================================================
	/// Report what a pass would do without touching the replica
	pub dry_run: bool,

	/// Descend into source links that point at directories
	pub follow_symlinks: bool,

	/// File/directory disagreement handling
	pub kind_mismatch: KindMismatchPolicy,

	/// Per-entry failure handling
	pub on_error: ErrorPolicy,

	/// Create the replica root when it is missing instead of failing the pass
	pub create_replica_root: bool,

	/// Carry access/modification times over to copies
	pub preserve_timestamps: bool,

	/// Read buffer for content hashing
	pub hash_buffer_size: usize,

	// ========================================================================
	// OUTPUT & LOGGING
	// ========================================================================
	/// Tracing level (trace, debug, info, warn, error, off)
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			source: None,
			replica: None,
			interval_secs: 60,
			log_file: PathBuf::from("replicr.log"),

			exclude_patterns: vec![],
			include_patterns: vec![],
			skip_hidden: true,
			hidden_prefix: ".".to_string(),

			dry_run: false,
			follow_symlinks: false,
			kind_mismatch: KindMismatchPolicy::Skip,
			on_error: ErrorPolicy::Continue,
			create_replica_root: false,
			preserve_timestamps: true,
			hash_buffer_size: HASH_BUFFER_SIZE,

			log_level: "info".to_string(),
		}
	}
}

impl Config {
	/// Load a config file, picking the format from its extension
	///
	/// `.json5` and `.json` are parsed with json5, anything else as TOML.
	pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
		let content = fs::read_to_string(path).map_err(|e| {
			ValidationError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
		})?;

		let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
		let parsed: Result<Config, String> = match ext.as_str() {
			"json5" | "json" => json5::from_str(&content).map_err(|e| e.to_string()),
			_ => toml::from_str(&content).map_err(|e| e.to_string()),
		};

		parsed.map_err(|e| {
			ValidationError::ConfigError(format!("Cannot parse {}: {}", path.display(), e))
		})
	}

	/// Apply `REPLICR_*` environment variables
	pub fn apply_env(&mut self) -> Result<(), ValidationError> {
		self.apply_env_with(|key| std::env::var(key).ok())
	}

	/// Apply overrides from an arbitrary variable lookup
	pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ValidationError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(v) = lookup("REPLICR_SOURCE") {
			self.source = Some(PathBuf::from(v));
		}
		if let Some(v) = lookup("REPLICR_REPLICA") {
			self.replica = Some(PathBuf::from(v));
		}
		if let Some(v) = lookup("REPLICR_INTERVAL") {
			self.interval_secs = v.trim().parse().map_err(|_| {
				ValidationError::ConfigError(format!(
					"REPLICR_INTERVAL must be a non-negative integer, got {:?}",
					v
				))
			})?;
		}
		if let Some(v) = lookup("REPLICR_LOG_FILE") {
			self.log_file = PathBuf::from(v);
		}
		if let Some(v) = lookup("REPLICR_DRY_RUN") {
			self.dry_run = parse_bool(&v).ok_or_else(|| {
				ValidationError::ConfigError(format!("REPLICR_DRY_RUN must be a boolean, got {:?}", v))
			})?;
		}
		Ok(())
	}

	/// Exclusion settings for [`crate::exclusion::ExclusionEngine`]
	pub fn exclude_config(&self) -> ExcludeConfig {
		ExcludeConfig {
			patterns: self.exclude_patterns.clone(),
			include_patterns: self.include_patterns.clone(),
			skip_hidden: self.skip_hidden,
			hidden_prefix: self.hidden_prefix.clone(),
		}
	}
}

impl Validator for Config {
	fn validate(&self) -> Result<(), ValidationError> {
		validation::validate_hash_buffer_size(self.hash_buffer_size)?;
		if self.skip_hidden {
			validation::validate_hidden_prefix(&self.hidden_prefix)?;
		}
		validation::validate_patterns(&self.exclude_patterns)?;
		validation::validate_patterns(&self.include_patterns)?;
		validation::validate_log_level(&self.log_level)?;
		Ok(())
	}
}

fn parse_bool(s: &str) -> Option<bool> {
	match s.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" | "" => Some(false),
		_ => None,
	}
}


// vim: ts=4
