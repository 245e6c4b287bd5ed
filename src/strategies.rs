//! Consolidated strategy and mode enums
//!
//! Each enum includes a FromStr implementation for CLI and config parsing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// KIND MISMATCH
// ============================================================================

/// What to do when a path is a file on one side and a directory on the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KindMismatchPolicy {
	/// Report a structural conflict and leave both sides untouched (default)
	#[default]
	Skip,

	/// Source wins: remove the replica entry, then copy/create from source
	Replace,
}

impl FromStr for KindMismatchPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"skip" | "report" => Ok(Self::Skip),
			"replace" | "source-wins" => Ok(Self::Replace),
			_ => Err(format!("Unknown kind mismatch policy: {}. Valid options: skip, replace", s)),
		}
	}
}

impl std::fmt::Display for KindMismatchPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Skip => write!(f, "skip"),
			Self::Replace => write!(f, "replace"),
		}
	}
}

// ============================================================================
// ERROR POLICY
// ============================================================================

/// How a per-entry failure affects the rest of the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
	/// Record a failure event, skip the entry and keep going (default)
	#[default]
	Continue,

	/// Stop the pass at the first failing entry
	Abort,
}

impl FromStr for ErrorPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"continue" | "skip" => Ok(Self::Continue),
			"abort" | "fail-fast" => Ok(Self::Abort),
			_ => Err(format!("Unknown error policy: {}. Valid options: continue, abort", s)),
		}
	}
}

impl std::fmt::Display for ErrorPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Continue => write!(f, "continue"),
			Self::Abort => write!(f, "abort"),
		}
	}
}


// vim: ts=4
