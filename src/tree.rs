//! Single-level directory listing and path classification
//!
//! The reconciler walks both trees itself, one directory at a time, so the
//! listing here never recurses.
//!
//! The two sides classify symbolic links differently. In the source a link is
//! looked through: a link to a file is mirrored by content, a link to a
//! directory is only descended into when following links. In the replica a
//! link is never looked through, so nothing is ever written outside the
//! replica; it shows up as [`EntryKind::Symlink`] and is removed or replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::logging::*;
use crate::types::{EntryKind, TreeEntry};

/// Classify a source path, returning `None` when nothing usable exists there
///
/// Links to files count as files. Links to directories count as directories
/// only with `follow_symlinks`; dangling links, special files (sockets,
/// FIFOs, devices) and missing paths are absent.
pub fn source_kind(path: &Path, follow_symlinks: bool) -> Result<Option<EntryKind>, SyncError> {
	let meta = match fs::symlink_metadata(path) {
		Ok(m) => m,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(SyncError::from_io(path, e)),
	};

	if !meta.file_type().is_symlink() {
		return Ok(classify(&meta));
	}

	let target = match fs::metadata(path) {
		Ok(m) => m,
		// Dangling link
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(SyncError::from_io(path, e)),
	};
	match classify(&target) {
		Some(EntryKind::Directory) if !follow_symlinks => {
			debug!("Not descending into directory link {}", path.display());
			Ok(None)
		}
		kind => Ok(kind),
	}
}

/// Classify a replica path without following links
pub fn replica_kind(path: &Path) -> Result<Option<EntryKind>, SyncError> {
	match fs::symlink_metadata(path) {
		Ok(m) if m.file_type().is_symlink() => Ok(Some(EntryKind::Symlink)),
		Ok(m) => Ok(classify(&m)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(SyncError::from_io(path, e)),
	}
}

fn classify(meta: &fs::Metadata) -> Option<EntryKind> {
	if meta.is_file() {
		Some(EntryKind::File)
	} else if meta.is_dir() {
		Some(EntryKind::Directory)
	} else {
		None
	}
}

/// Children of one directory, split into usable entries and per-entry failures
#[derive(Debug, Default)]
pub struct DirListing {
	/// Sorted by name, paths relative to the tree root
	pub entries: Vec<TreeEntry>,
	/// Children that could not be classified, with their relative paths
	pub failures: Vec<(PathBuf, SyncError)>,
}

/// List the direct children of source directory `root.join(relative_dir)`
///
/// Failing to open the directory itself is an error; failing on a single
/// child is recorded in [`DirListing::failures`] and the rest is still listed.
pub fn list_dir(
	root: &Path,
	relative_dir: &Path,
	follow_symlinks: bool,
) -> Result<DirListing, SyncError> {
	list_with(root, relative_dir, |path| source_kind(path, follow_symlinks))
}

/// List the direct children of replica directory `root.join(relative_dir)`
///
/// Links are reported as [`EntryKind::Symlink`] entries, never followed.
pub fn list_replica_dir(root: &Path, relative_dir: &Path) -> Result<DirListing, SyncError> {
	list_with(root, relative_dir, replica_kind)
}

fn list_with<F>(root: &Path, relative_dir: &Path, classify_path: F) -> Result<DirListing, SyncError>
where
	F: Fn(&Path) -> Result<Option<EntryKind>, SyncError>,
{
	let dir = root.join(relative_dir);
	let read_dir = fs::read_dir(&dir).map_err(|e| SyncError::from_io(&dir, e))?;

	let mut listing = DirListing::default();
	for entry_result in read_dir {
		let entry = match entry_result {
			Ok(e) => e,
			Err(e) => {
				// No name to attach; blame the directory
				listing.failures.push((relative_dir.to_path_buf(), SyncError::from_io(&dir, e)));
				continue;
			}
		};
		let path = entry.path();
		let relative_path = relative_dir.join(entry.file_name());

		match classify_path(&path) {
			Ok(Some(kind)) => listing.entries.push(TreeEntry::new(relative_path, kind)),
			Ok(None) => {
				debug!("Skipping {} (link, special file or vanished)", path.display());
			}
			Err(e) => listing.failures.push((relative_path, e)),
		}
	}

	listing.entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
	Ok(listing)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_list_dir_sorted_and_relative() {
		let temp_dir = TempDir::new().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("sub/inner")).unwrap();
		fs::write(root.join("sub/z.txt"), "z").unwrap();
		fs::write(root.join("sub/a.txt"), "a").unwrap();

		let entries = list_dir(root, Path::new("sub"), false).unwrap().entries;
		let paths: Vec<_> = entries.iter().map(|e| e.relative_path.clone()).collect();
		assert_eq!(
			paths,
			vec![PathBuf::from("sub/a.txt"), PathBuf::from("sub/inner"), PathBuf::from("sub/z.txt")]
		);
		assert_eq!(entries[1].kind, EntryKind::Directory);
	}

	#[test]
	fn test_list_root_uses_bare_names() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("f"), "").unwrap();

		let listing = list_dir(temp_dir.path(), Path::new(""), false).unwrap();
		assert!(listing.failures.is_empty());
		let entries = listing.entries;
		assert_eq!(entries, vec![TreeEntry::new("f", EntryKind::File)]);
	}

	#[test]
	fn test_missing_path_has_no_kind() {
		let temp_dir = TempDir::new().unwrap();
		assert_eq!(source_kind(&temp_dir.path().join("nope"), false).unwrap(), None);
		assert_eq!(replica_kind(&temp_dir.path().join("nope")).unwrap(), None);
	}

	#[cfg(unix)]
	#[test]
	fn test_source_links_looked_through() {
		use std::os::unix::fs::symlink;

		let temp_dir = TempDir::new().unwrap();
		let root = temp_dir.path();
		fs::write(root.join("target.txt"), "t").unwrap();
		fs::create_dir(root.join("target_dir")).unwrap();
		symlink(root.join("target.txt"), root.join("link")).unwrap();
		symlink(root.join("target_dir"), root.join("dir_link")).unwrap();
		symlink(root.join("missing"), root.join("dangling")).unwrap();

		assert_eq!(source_kind(&root.join("link"), false).unwrap(), Some(EntryKind::File));
		assert_eq!(source_kind(&root.join("link"), true).unwrap(), Some(EntryKind::File));
		assert_eq!(source_kind(&root.join("dir_link"), false).unwrap(), None);
		assert_eq!(source_kind(&root.join("dir_link"), true).unwrap(), Some(EntryKind::Directory));
		assert_eq!(source_kind(&root.join("dangling"), true).unwrap(), None);
	}

	#[cfg(unix)]
	#[test]
	fn test_replica_links_never_followed() {
		use std::os::unix::fs::symlink;

		let temp_dir = TempDir::new().unwrap();
		let root = temp_dir.path();
		fs::create_dir(root.join("elsewhere")).unwrap();
		symlink(root.join("elsewhere"), root.join("d")).unwrap();
		symlink(root.join("missing"), root.join("dangling")).unwrap();

		assert_eq!(replica_kind(&root.join("d")).unwrap(), Some(EntryKind::Symlink));

		let listing = list_replica_dir(root, Path::new("")).unwrap();
		let kinds: Vec<_> = listing.entries.iter().map(|e| (e.name().to_string(), e.kind)).collect();
		assert_eq!(
			kinds,
			vec![
				("d".to_string(), EntryKind::Symlink),
				("dangling".to_string(), EntryKind::Symlink),
				("elsewhere".to_string(), EntryKind::Directory),
			]
		);
	}
}

// vim: ts=4
