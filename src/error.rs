//! Error types for replicr operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{EntryKind, RootRole};
use crate::validation::ValidationError;

/// Main error type for reconciliation
#[derive(Debug)]
pub enum SyncError {
	/// A tree root is missing, not a directory or unreadable at pass start
	RootUnavailable { role: RootRole, path: PathBuf, source: io::Error },

	/// I/O failure on a single entry (open, read, write, permission)
	Io { path: PathBuf, source: io::Error },

	/// Entry vanished between listing and operating on it
	NotFound { path: PathBuf },

	/// Same relative path is a file on one side and a directory on the other
	StructuralConflict { path: PathBuf, source_kind: EntryKind, replica_kind: EntryKind },

	/// Roots or configuration rejected before the pass started
	Validation(ValidationError),

	/// Generic error message
	Other { message: String },
}

impl SyncError {
	/// Classify an I/O error raised while operating on `path`
	///
	/// `NotFound` is split out so a race with a concurrent deletion can be
	/// told apart from a genuine read/write failure.
	pub fn from_io(path: &Path, err: io::Error) -> Self {
		if err.kind() == io::ErrorKind::NotFound {
			SyncError::NotFound { path: path.to_path_buf() }
		} else {
			SyncError::Io { path: path.to_path_buf(), source: err }
		}
	}

	/// Whether this error aborts the whole pass regardless of error policy
	pub fn is_fatal(&self) -> bool {
		matches!(self, SyncError::RootUnavailable { .. } | SyncError::Validation(_))
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::RootUnavailable { role, path, source } => {
				write!(f, "{} root {} is unavailable: {}", role, path.display(), source)
			}
			SyncError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
			SyncError::NotFound { path } => {
				write!(f, "{} disappeared during the pass", path.display())
			}
			SyncError::StructuralConflict { path, source_kind, replica_kind } => write!(
				f,
				"{} is a {} in source but a {} in replica",
				path.display(),
				source_kind,
				replica_kind
			),
			SyncError::Validation(e) => write!(f, "{}", e),
			SyncError::Other { message } => write!(f, "{}", message),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::RootUnavailable { source, .. } | SyncError::Io { source, .. } => Some(source),
			SyncError::Validation(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ValidationError> for SyncError {
	fn from(e: ValidationError) -> Self {
		SyncError::Validation(e)
	}
}

impl From<String> for SyncError {
	fn from(e: String) -> Self {
		SyncError::Other { message: e }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_io_splits_not_found() {
		let path = Path::new("a/b.txt");
		let err = SyncError::from_io(path, io::Error::new(io::ErrorKind::NotFound, "gone"));
		assert!(matches!(err, SyncError::NotFound { .. }));

		let err =
			SyncError::from_io(path, io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
		assert!(matches!(err, SyncError::Io { .. }));
		assert!(err.to_string().contains("a/b.txt"));
	}

	#[test]
	fn test_structural_conflict_display() {
		let err = SyncError::StructuralConflict {
			path: PathBuf::from("x"),
			source_kind: EntryKind::File,
			replica_kind: EntryKind::Directory,
		};
		assert_eq!(err.to_string(), "x is a file in source but a directory in replica");
	}

	#[test]
	fn test_fatal_classification() {
		let root = SyncError::RootUnavailable {
			role: RootRole::Source,
			path: PathBuf::from("/missing"),
			source: io::Error::new(io::ErrorKind::NotFound, "gone"),
		};
		assert!(root.is_fatal());
		assert!(root.to_string().starts_with("source root /missing"));
		assert!(!SyncError::NotFound { path: PathBuf::from("x") }.is_fatal());
	}
}

// vim: ts=4
