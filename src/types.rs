//! Core data types shared by the tree walker, the reconciler and the log sink

use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Kind of a filesystem node as seen by the reconciler
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum EntryKind {
	File,
	Directory,
	/// Symbolic link left as is; only reported for the replica side
	Symlink,
}

impl fmt::Display for EntryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryKind::File => write!(f, "file"),
			EntryKind::Directory => write!(f, "directory"),
			EntryKind::Symlink => write!(f, "symlink"),
		}
	}
}

/// Which side of the mirror a path belongs to
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RootRole {
	Source,
	Replica,
}

impl fmt::Display for RootRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RootRole::Source => write!(f, "source"),
			RootRole::Replica => write!(f, "replica"),
		}
	}
}

/// A node discovered while listing a tree, identified by its path relative to the root
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TreeEntry {
	pub relative_path: PathBuf,
	pub kind: EntryKind,
}

impl TreeEntry {
	pub fn new(relative_path: impl Into<PathBuf>, kind: EntryKind) -> Self {
		Self { relative_path: relative_path.into(), kind }
	}

	/// Leaf name of the entry (empty for the root itself)
	pub fn name(&self) -> &str {
		self.relative_path.file_name().and_then(|n| n.to_str()).unwrap_or("")
	}

	pub fn is_file(&self) -> bool {
		self.kind == EntryKind::File
	}

	pub fn is_dir(&self) -> bool {
		self.kind == EntryKind::Directory
	}

	pub fn is_symlink(&self) -> bool {
		self.kind == EntryKind::Symlink
	}

	/// Absolute location of this entry under `root`
	pub fn under(&self, root: &Path) -> PathBuf {
		root.join(&self.relative_path)
	}
}

/// What a single applied mutation did
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SyncEventKind {
	CopiedNew,
	CopiedModified,
	RemovedFile,
	RemovedDirectory,
	CreatedDirectory,
	/// Per-entry failure that was skipped; carries the cause
	Failed(String),
}

impl SyncEventKind {
	/// Label used in the durable log
	pub fn label(&self) -> &'static str {
		match self {
			SyncEventKind::CopiedNew => "COPIED NEW FILE",
			SyncEventKind::CopiedModified => "COPIED MODIFIED FILE",
			SyncEventKind::RemovedFile => "REMOVED FILE",
			SyncEventKind::RemovedDirectory => "REMOVED DIRECTORY",
			SyncEventKind::CreatedDirectory => "COPIED NEW DIRECTORY",
			SyncEventKind::Failed(_) => "SYNC ERROR",
		}
	}

	pub fn is_error(&self) -> bool {
		matches!(self, SyncEventKind::Failed(_))
	}
}

/// Immutable record of one applied mutation (or one skipped failure)
#[derive(Clone, PartialEq, Debug)]
pub struct SyncEvent {
	pub kind: SyncEventKind,
	pub relative_path: PathBuf,
	pub timestamp: DateTime<Local>,
}

impl SyncEvent {
	pub fn new(kind: SyncEventKind, relative_path: impl Into<PathBuf>) -> Self {
		Self { kind, relative_path: relative_path.into(), timestamp: Local::now() }
	}

	/// Render as `"<EVENT_KIND>: <relative_path>"`, the line handed to the log sink
	pub fn log_entry(&self) -> String {
		match &self.kind {
			SyncEventKind::Failed(cause) => {
				format!("{}: {} ({})", self.kind.label(), self.relative_path.display(), cause)
			}
			kind => format!("{}: {}", kind.label(), self.relative_path.display()),
		}
	}
}

impl fmt::Display for SyncEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.log_entry())
	}
}

/// Outcome of one reconcile pass
#[derive(Clone, Debug, Default)]
pub struct SyncReport {
	/// Events in the order they were applied
	pub events: Vec<SyncEvent>,
	pub files_copied: usize,
	pub files_updated: usize,
	pub files_removed: usize,
	pub dirs_created: usize,
	pub dirs_removed: usize,
	pub errors: usize,
	pub duration: Duration,
	pub dry_run: bool,
}

impl SyncReport {
	pub(crate) fn record(&mut self, event: SyncEvent) {
		match event.kind {
			SyncEventKind::CopiedNew => self.files_copied += 1,
			SyncEventKind::CopiedModified => self.files_updated += 1,
			SyncEventKind::RemovedFile => self.files_removed += 1,
			SyncEventKind::RemovedDirectory => self.dirs_removed += 1,
			SyncEventKind::CreatedDirectory => self.dirs_created += 1,
			SyncEventKind::Failed(_) => self.errors += 1,
		}
		self.events.push(event);
	}

	/// True when the pass applied nothing and hit no errors
	pub fn is_noop(&self) -> bool {
		self.events.is_empty()
	}

	pub fn has_errors(&self) -> bool {
		self.errors > 0
	}

	/// Events of one kind, in order; handy for assertions and summaries
	pub fn paths_of(&self, kind: &SyncEventKind) -> Vec<&Path> {
		self.events
			.iter()
			.filter(|e| &e.kind == kind)
			.map(|e| e.relative_path.as_path())
			.collect()
	}
}

impl fmt::Display for SyncReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} new, {} modified, {} removed files; {} created, {} removed directories; {} errors in {:.2?}",
			self.files_copied,
			self.files_updated,
			self.files_removed,
			self.dirs_created,
			self.dirs_removed,
			self.errors,
			self.duration
		)?;
		if self.dry_run {
			write!(f, " (dry run)")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_entry_format() {
		let event = SyncEvent::new(SyncEventKind::CopiedNew, "a/b.txt");
		assert_eq!(event.log_entry(), "COPIED NEW FILE: a/b.txt");

		let event = SyncEvent::new(SyncEventKind::Failed("permission denied".into()), "c");
		assert_eq!(event.log_entry(), "SYNC ERROR: c (permission denied)");
	}

	#[test]
	fn test_report_counters() {
		let mut report = SyncReport::default();
		report.record(SyncEvent::new(SyncEventKind::CreatedDirectory, "a"));
		report.record(SyncEvent::new(SyncEventKind::CopiedNew, "a/b.txt"));
		report.record(SyncEvent::new(SyncEventKind::Failed("x".into()), "a/c.txt"));

		assert_eq!(report.dirs_created, 1);
		assert_eq!(report.files_copied, 1);
		assert_eq!(report.errors, 1);
		assert!(report.has_errors());
		assert_eq!(report.paths_of(&SyncEventKind::CopiedNew), vec![Path::new("a/b.txt")]);
	}

	#[test]
	fn test_tree_entry_name() {
		let entry = TreeEntry::new("dir/.hidden", EntryKind::File);
		assert_eq!(entry.name(), ".hidden");
		assert!(entry.is_file());
		assert_eq!(entry.under(Path::new("/root")), PathBuf::from("/root/dir/.hidden"));
	}
}

// vim: ts=4
