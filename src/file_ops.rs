//! Filesystem mutations applied to the replica
//!
//! File copies go through a temporary sibling and a rename, so a reader of
//! the replica sees either the old or the new content of a file, never a
//! partially written one.

use filetime::FileTime;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::logging::*;

/// Suffix of in-flight copies
pub const TEMP_SUFFIX: &str = ".replicr-tmp";

/// Whether a leaf name belongs to an in-flight (or orphaned) copy
///
/// Only the exact `.<name>.replicr-tmp` shape produced by [`temp_path_for`]
/// matches; a user file that merely ends in the suffix does not.
pub fn is_temp_name(name: &str) -> bool {
	name.len() > 1 + TEMP_SUFFIX.len() && name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Temporary path used while copying into `dest`
pub fn temp_path_for(dest: &Path) -> PathBuf {
	let mut tmp_name = OsString::from(".");
	if let Some(name) = dest.file_name() {
		tmp_name.push(name);
	}
	tmp_name.push(TEMP_SUFFIX);
	dest.with_file_name(tmp_name)
}

/// Copy `src` over `dest`, creating missing ancestors of `dest`
///
/// Content and permission bits come from the copy primitive; access and
/// modification times are carried over when `preserve_times` is set.
pub fn copy_file(src: &Path, dest: &Path, preserve_times: bool) -> Result<(), SyncError> {
	if let Some(parent) = dest.parent() {
		fs::create_dir_all(parent).map_err(|e| SyncError::from_io(parent, e))?;
	}

	let tmp_path = temp_path_for(dest);
	let result = copy_via_temp(src, dest, &tmp_path, preserve_times);
	if result.is_err() {
		// Ignore "not found": the temp file may never have been created
		if let Err(e) = fs::remove_file(&tmp_path) {
			if e.kind() != io::ErrorKind::NotFound {
				warn!("Failed to remove temp file {}: {}", tmp_path.display(), e);
			}
		}
	}
	result
}

fn copy_via_temp(
	src: &Path,
	dest: &Path,
	tmp_path: &Path,
	preserve_times: bool,
) -> Result<(), SyncError> {
	fs::copy(src, tmp_path).map_err(|e| {
		// The destination side rarely vanishes; blame the source on NotFound
		if e.kind() == io::ErrorKind::NotFound {
			SyncError::from_io(src, e)
		} else {
			SyncError::from_io(tmp_path, e)
		}
	})?;

	if preserve_times {
		let meta = fs::metadata(src).map_err(|e| SyncError::from_io(src, e))?;
		let atime = FileTime::from_last_access_time(&meta);
		let mtime = FileTime::from_last_modification_time(&meta);
		filetime::set_file_times(tmp_path, atime, mtime)
			.map_err(|e| SyncError::from_io(tmp_path, e))?;
	}

	fs::rename(tmp_path, dest).map_err(|e| SyncError::from_io(dest, e))
}

/// Create `dir` and any missing ancestors; succeeds if it already exists
pub fn create_dir_all(dir: &Path) -> Result<(), SyncError> {
	fs::create_dir_all(dir).map_err(|e| SyncError::from_io(dir, e))
}

/// Remove a single file
pub fn remove_file(path: &Path) -> Result<(), SyncError> {
	fs::remove_file(path).map_err(|e| SyncError::from_io(path, e))
}

/// Remove a directory and everything below it
pub fn remove_dir_all(path: &Path) -> Result<(), SyncError> {
	fs::remove_dir_all(path).map_err(|e| SyncError::from_io(path, e))
}

/// Remove orphaned temporary files from interrupted copies under `dir`
///
/// Returns the number of files removed. Unreadable directories are logged
/// and skipped; cleanup never fails the pass.
pub fn cleanup_temp_files(dir: &Path) -> usize {
	let mut count = 0;
	scan_dir(dir, &mut count);
	if count > 0 {
		info!("Cleaned up {} orphaned temporary files", count);
	}
	count
}

fn scan_dir(dir: &Path, count: &mut usize) {
	let entries = match fs::read_dir(dir) {
		Ok(e) => e,
		Err(e) => {
			warn!("Cannot read directory {} during cleanup: {}", dir.display(), e);
			return;
		}
	};

	for entry_result in entries {
		let entry = match entry_result {
			Ok(e) => e,
			Err(e) => {
				debug!("Error reading directory entry during cleanup: {}", e);
				continue;
			}
		};

		let path = entry.path();
		let file_type = match entry.file_type() {
			Ok(t) => t,
			Err(e) => {
				warn!("Cannot access {} during cleanup: {}", path.display(), e);
				continue;
			}
		};

		if file_type.is_dir() {
			scan_dir(&path, count);
		} else if file_type.is_file() && entry.file_name().to_str().map_or(false, is_temp_name) {
			debug!("Removing orphaned temp file: {}", path.display());
			match fs::remove_file(&path) {
				Ok(_) => *count += 1,
				Err(e) if e.kind() == io::ErrorKind::NotFound => {
					debug!("Temp file already removed: {}", path.display());
				}
				Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_temp_path_is_hidden_sibling() {
		let tmp = temp_path_for(Path::new("/r/a/b.txt"));
		assert_eq!(tmp, PathBuf::from("/r/a/.b.txt.replicr-tmp"));
		assert!(is_temp_name(".b.txt.replicr-tmp"));
		assert!(!is_temp_name("b.txt"));
	}

	#[test]
	fn test_temp_name_requires_exact_shape() {
		assert!(!is_temp_name("notes.replicr-tmp"));
		assert!(!is_temp_name(".replicr-tmp"));
		assert!(is_temp_name(".x.replicr-tmp"));
	}

	#[test]
	fn test_copy_creates_ancestors_and_keeps_mtime() {
		let temp_dir = TempDir::new().unwrap();
		let src = temp_dir.path().join("src.txt");
		fs::write(&src, "payload").unwrap();
		let mtime = FileTime::from_unix_time(1_000_000_000, 0);
		filetime::set_file_mtime(&src, mtime).unwrap();

		let dest = temp_dir.path().join("deep/er/dest.txt");
		copy_file(&src, &dest, true).unwrap();

		assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
		let meta = fs::metadata(&dest).unwrap();
		assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
		assert!(!temp_path_for(&dest).exists());
	}

	#[test]
	fn test_copy_overwrites() {
		let temp_dir = TempDir::new().unwrap();
		let src = temp_dir.path().join("src");
		let dest = temp_dir.path().join("dest");
		fs::write(&src, "new").unwrap();
		fs::write(&dest, "old content").unwrap();

		copy_file(&src, &dest, false).unwrap();
		assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
	}

	#[test]
	fn test_copy_missing_source_leaves_no_temp() {
		let temp_dir = TempDir::new().unwrap();
		let dest = temp_dir.path().join("dest");
		let err = copy_file(&temp_dir.path().join("missing"), &dest, true).unwrap_err();

		assert!(matches!(err, SyncError::NotFound { .. }));
		assert!(!dest.exists());
		assert!(!temp_path_for(&dest).exists());
	}

	#[test]
	fn test_cleanup_temp_files() {
		let temp_dir = TempDir::new().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("a/b")).unwrap();
		fs::write(root.join(".x.replicr-tmp"), "").unwrap();
		fs::write(root.join("a/b/.y.replicr-tmp"), "").unwrap();
		fs::write(root.join("a/keep.txt"), "").unwrap();
		fs::write(root.join("a/user.replicr-tmp"), "mine").unwrap();

		assert_eq!(cleanup_temp_files(root), 2);
		assert!(root.join("a/keep.txt").exists());
		assert!(root.join("a/user.replicr-tmp").exists());
		assert!(!root.join("a/b/.y.replicr-tmp").exists());
	}
}

// vim: ts=4
