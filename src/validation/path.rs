//! Root path validation
//!
//! Mirroring a tree into itself, or into one of its own subdirectories,
//! would make every pass copy its previous output again. Both roots are
//! canonicalized before comparison so symlinked or relative spellings of the
//! same directory are caught.

use std::path::{Path, PathBuf};

use super::ValidationError;

/// Check if path is within a root directory
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	path.starts_with(root)
}

/// Canonical form of `path`, or the path itself when it does not exist yet
fn canonical_or_self(path: &Path) -> PathBuf {
	path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Validate that source and replica are distinct, non-nested trees
///
/// A replica root that does not exist yet is compared by its absolute
/// spelling, since it cannot be canonicalized.
pub fn validate_roots(source: &Path, replica: &Path) -> Result<(), ValidationError> {
	let source_abs = canonical_or_self(source);
	let replica_abs = match replica.parent() {
		// Resolve the parent so a missing leaf still compares correctly
		Some(parent) if !replica.exists() && !parent.as_os_str().is_empty() => {
			match (parent.canonicalize(), replica.file_name()) {
				(Ok(p), Some(name)) => p.join(name),
				_ => replica.to_path_buf(),
			}
		}
		_ => canonical_or_self(replica),
	};

	if source_abs == replica_abs {
		return Err(ValidationError::PathError(format!(
			"Source and replica are the same directory: {}",
			source_abs.display()
		)));
	}
	if is_path_within_root(&replica_abs, &source_abs) {
		return Err(ValidationError::PathError(format!(
			"Replica {} is inside source {}",
			replica_abs.display(),
			source_abs.display()
		)));
	}
	if is_path_within_root(&source_abs, &replica_abs) {
		return Err(ValidationError::PathError(format!(
			"Source {} is inside replica {}",
			source_abs.display(),
			replica_abs.display()
		)));
	}
	Ok(())
}


// vim: ts=4
