//! One-way reconciliation of a replica tree against a source tree
//!
//! A pass runs in two phases over freshly listed trees:
//!
//! 1. **Additions** walk the source top-down. Missing files are copied,
//!    files whose content digest differs are copied over, missing
//!    directories are created.
//! 2. **Removals** walk the replica top-down, but only after the additions
//!    phase has finished for the whole tree. Files and directories without
//!    a source counterpart are deleted; a deleted directory is not walked.
//!
//! Replica links are never followed. A link where the source has an entry is
//! removed before the copy or directory takes its place, and a link without
//! a source counterpart is removed like a file.
//!
//! Every applied mutation is reported as a [`SyncEvent`] to the configured
//! callbacks the moment it is applied. Nothing is persisted between passes.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::callbacks::{NoCallbacks, SyncCallbacks};
use crate::config::Config;
use crate::error::SyncError;
use crate::exclusion::{EntryFilter, ExclusionEngine, ExclusionError};
use crate::file_ops;
use crate::hasher::{self, ContentDigest, HASH_BUFFER_SIZE};
use crate::logging::*;
use crate::strategies::{ErrorPolicy, KindMismatchPolicy};
use crate::tree;
use crate::types::{EntryKind, RootRole, SyncEvent, SyncEventKind, SyncReport, TreeEntry};
use crate::validation::{self, ValidationError};

/// Behavior switches for a [`Reconciler`]
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
	pub dry_run: bool,
	pub follow_symlinks: bool,
	pub kind_mismatch: KindMismatchPolicy,
	pub on_error: ErrorPolicy,
	pub create_replica_root: bool,
	pub preserve_timestamps: bool,
	pub hash_buffer_size: usize,
}

impl Default for ReconcileOptions {
	fn default() -> Self {
		Self {
			dry_run: false,
			follow_symlinks: false,
			kind_mismatch: KindMismatchPolicy::Skip,
			on_error: ErrorPolicy::Continue,
			create_replica_root: false,
			preserve_timestamps: true,
			hash_buffer_size: HASH_BUFFER_SIZE,
		}
	}
}

impl From<&Config> for ReconcileOptions {
	fn from(config: &Config) -> Self {
		Self {
			dry_run: config.dry_run,
			follow_symlinks: config.follow_symlinks,
			kind_mismatch: config.kind_mismatch,
			on_error: config.on_error,
			create_replica_root: config.create_replica_root,
			preserve_timestamps: config.preserve_timestamps,
			hash_buffer_size: config.hash_buffer_size,
		}
	}
}

/// Applies passes; holds no state between them
pub struct Reconciler {
	options: ReconcileOptions,
	filter: Box<dyn EntryFilter>,
	callbacks: Box<dyn SyncCallbacks>,
}

impl Reconciler {
	/// Reconciler with the default hidden-file rule and no callbacks
	pub fn new(options: ReconcileOptions) -> Self {
		Self {
			options,
			filter: Box::new(ExclusionEngine::default()),
			callbacks: Box::new(NoCallbacks),
		}
	}

	/// Reconciler configured from a [`Config`], exclusions included
	pub fn from_config(config: &Config) -> Result<Self, SyncError> {
		let engine = ExclusionEngine::new(&config.exclude_config()).map_err(|e: ExclusionError| {
			SyncError::Validation(ValidationError::ConfigError(e.to_string()))
		})?;
		Ok(Self::new(config.into()).with_filter(Box::new(engine)))
	}

	/// Replace the entry filter deciding what is compared at all
	pub fn with_filter(mut self, filter: Box<dyn EntryFilter>) -> Self {
		self.filter = filter;
		self
	}

	/// Replace the event receiver
	pub fn with_callbacks(mut self, callbacks: Box<dyn SyncCallbacks>) -> Self {
		self.callbacks = callbacks;
		self
	}

	pub fn options(&self) -> &ReconcileOptions {
		&self.options
	}

	/// Run one full pass: additions, then removals
	///
	/// Entry-level failures become [`SyncEventKind::Failed`] events under
	/// [`ErrorPolicy::Continue`]. An unavailable root, invalid roots, or any
	/// failure under [`ErrorPolicy::Abort`] ends the pass with `Err`.
	pub fn reconcile(&self, source: &Path, replica: &Path) -> Result<SyncReport, SyncError> {
		let started = Instant::now();
		let mut pass = Pass::new(self, source, replica);

		match pass.run() {
			Ok(()) => {
				let mut report = pass.report;
				report.duration = started.elapsed();
				info!("Pass complete: {}", report);
				self.callbacks.on_pass_complete(&report);
				Ok(report)
			}
			Err(e) => {
				error!("Pass aborted after {} events: {}", pass.report.events.len(), e);
				self.callbacks.on_pass_failed(&e);
				Err(e)
			}
		}
	}
}

/// State of one pass in progress
struct Pass<'a> {
	reconciler: &'a Reconciler,
	source: &'a Path,
	replica: &'a Path,
	report: SyncReport,
}

impl<'a> Pass<'a> {
	fn new(reconciler: &'a Reconciler, source: &'a Path, replica: &'a Path) -> Self {
		let report = SyncReport { dry_run: reconciler.options.dry_run, ..Default::default() };
		Self { reconciler, source, replica, report }
	}

	fn opts(&self) -> &ReconcileOptions {
		&self.reconciler.options
	}

	fn run(&mut self) -> Result<(), SyncError> {
		let replica_missing = self.check_roots()?;

		if !self.opts().dry_run {
			file_ops::cleanup_temp_files(self.replica);
		}

		debug!("Additions: {} -> {}", self.source.display(), self.replica.display());
		self.add_dir(Path::new(""), replica_missing)?;

		// A dry run never created the replica root, so there is nothing to remove from
		if !replica_missing {
			debug!("Removals: {}", self.replica.display());
			self.remove_dir(Path::new(""))?;
		}
		Ok(())
	}

	/// Verify both roots; returns whether the replica root is (still) absent
	fn check_roots(&self) -> Result<bool, SyncError> {
		validation::validate_roots(self.source, self.replica)?;

		let source_meta = fs::metadata(self.source).map_err(|e| SyncError::RootUnavailable {
			role: RootRole::Source,
			path: self.source.to_path_buf(),
			source: e,
		})?;
		if !source_meta.is_dir() {
			return Err(not_a_directory(RootRole::Source, self.source));
		}
		fs::read_dir(self.source).map_err(|e| SyncError::RootUnavailable {
			role: RootRole::Source,
			path: self.source.to_path_buf(),
			source: e,
		})?;

		match fs::metadata(self.replica) {
			Ok(meta) if meta.is_dir() => Ok(false),
			Ok(_) => Err(not_a_directory(RootRole::Replica, self.replica)),
			Err(e) if e.kind() == io::ErrorKind::NotFound && self.opts().create_replica_root => {
				if self.opts().dry_run {
					return Ok(true);
				}
				info!("Creating replica root {}", self.replica.display());
				fs::create_dir_all(self.replica).map_err(|e| SyncError::RootUnavailable {
					role: RootRole::Replica,
					path: self.replica.to_path_buf(),
					source: e,
				})?;
				Ok(false)
			}
			Err(e) => Err(SyncError::RootUnavailable {
				role: RootRole::Replica,
				path: self.replica.to_path_buf(),
				source: e,
			}),
		}
	}

	// ------------------------------------------------------------------------
	// Event plumbing
	// ------------------------------------------------------------------------

	fn emit(&mut self, kind: SyncEventKind, relative_path: &Path) {
		let event = SyncEvent::new(kind, relative_path);
		self.reconciler.callbacks.on_event(&event);
		self.report.record(event);
	}

	/// Apply the error policy to a per-entry failure
	fn fail(&mut self, relative_path: &Path, err: SyncError) -> Result<(), SyncError> {
		if self.opts().on_error == ErrorPolicy::Abort {
			return Err(err);
		}
		warn!("Skipping {}: {}", relative_path.display(), err);
		self.emit(SyncEventKind::Failed(err.to_string()), relative_path);
		Ok(())
	}

	/// Run a mutation unless this is a dry run
	fn apply<F>(&self, op: F) -> Result<(), SyncError>
	where
		F: FnOnce() -> Result<(), SyncError>,
	{
		if self.opts().dry_run {
			Ok(())
		} else {
			op()
		}
	}

	fn excluded(&self, entry: &TreeEntry) -> bool {
		let excluded = self.reconciler.filter.is_excluded(entry);
		if excluded {
			debug!("Excluded {}", entry.relative_path.display());
		}
		excluded
	}

	fn source_kind_at(&self, path: &Path) -> Result<Option<EntryKind>, SyncError> {
		tree::source_kind(path, self.opts().follow_symlinks)
	}

	fn digest(&self, path: &Path) -> Result<ContentDigest, SyncError> {
		hasher::digest_with_buffer(path, self.opts().hash_buffer_size)
	}

	// ------------------------------------------------------------------------
	// Additions
	// ------------------------------------------------------------------------

	/// Mirror one source directory; `fresh` means its replica side is known empty
	fn add_dir(&mut self, rel: &Path, fresh: bool) -> Result<(), SyncError> {
		let listing = match tree::list_dir(self.source, rel, self.opts().follow_symlinks) {
			Ok(l) => l,
			Err(e) => return self.fail(rel, e),
		};
		for (path, err) in listing.failures {
			self.fail(&path, err)?;
		}

		let (files, dirs): (Vec<TreeEntry>, Vec<TreeEntry>) = listing
			.entries
			.into_iter()
			.filter(|e| !self.excluded(e))
			.partition(|e| e.is_file());

		for file in &files {
			self.add_file(file, fresh)?;
		}

		let mut descend = Vec::with_capacity(dirs.len());
		for dir in dirs {
			if let Some(dir_fresh) = self.ensure_dir(&dir, fresh)? {
				descend.push((dir, dir_fresh));
			}
		}
		for (dir, dir_fresh) in descend {
			self.add_dir(&dir.relative_path, dir_fresh)?;
		}
		Ok(())
	}

	fn add_file(&mut self, entry: &TreeEntry, fresh: bool) -> Result<(), SyncError> {
		let rel = entry.relative_path.as_path();
		let src = entry.under(self.source);
		let dst = entry.under(self.replica);

		let existing = if fresh {
			None
		} else {
			match tree::replica_kind(&dst) {
				Ok(kind) => kind,
				Err(e) => return self.fail(rel, e),
			}
		};

		match existing {
			None => self.copy(rel, &src, &dst, SyncEventKind::CopiedNew),
			Some(EntryKind::File) => {
				let src_digest = match self.digest(&src) {
					Ok(d) => d,
					Err(e) => return self.fail(rel, e),
				};
				let dst_digest = match self.digest(&dst) {
					Ok(d) => d,
					Err(e) => return self.fail(rel, e),
				};

				if src_digest == dst_digest {
					debug!("Unchanged {}", rel.display());
					Ok(())
				} else {
					debug!("Changed {}: {} -> {}", rel.display(), dst_digest, src_digest);
					self.copy(rel, &src, &dst, SyncEventKind::CopiedModified)
				}
			}
			Some(EntryKind::Symlink) => {
				// Replace the link itself; never write through it
				if let Err(e) = self.apply(|| file_ops::remove_file(&dst)) {
					return self.fail(rel, e);
				}
				self.emit(SyncEventKind::RemovedFile, rel);
				self.copy(rel, &src, &dst, SyncEventKind::CopiedNew)
			}
			Some(EntryKind::Directory) => match self.opts().kind_mismatch {
				KindMismatchPolicy::Skip => {
					self.fail(rel, conflict(rel, EntryKind::File, EntryKind::Directory))
				}
				KindMismatchPolicy::Replace => {
					if let Err(e) = self.apply(|| file_ops::remove_dir_all(&dst)) {
						return self.fail(rel, e);
					}
					self.emit(SyncEventKind::RemovedDirectory, rel);
					self.copy(rel, &src, &dst, SyncEventKind::CopiedNew)
				}
			},
		}
	}

	fn copy(
		&mut self,
		rel: &Path,
		src: &Path,
		dst: &Path,
		kind: SyncEventKind,
	) -> Result<(), SyncError> {
		let preserve = self.opts().preserve_timestamps;
		match self.apply(|| file_ops::copy_file(src, dst, preserve)) {
			Ok(()) => {
				self.emit(kind, rel);
				Ok(())
			}
			Err(e) => self.fail(rel, e),
		}
	}

	/// Make sure the replica has this directory
	///
	/// Returns `None` when the subtree must not be descended into (conflict
	/// left in place, or creation failed), otherwise whether the replica
	/// side is known to be empty.
	fn ensure_dir(&mut self, entry: &TreeEntry, fresh: bool) -> Result<Option<bool>, SyncError> {
		let rel = entry.relative_path.as_path();
		let dst = entry.under(self.replica);

		let existing = if fresh {
			None
		} else {
			match tree::replica_kind(&dst) {
				Ok(kind) => kind,
				Err(e) => {
					self.fail(rel, e)?;
					return Ok(None);
				}
			}
		};

		match existing {
			Some(EntryKind::Directory) => Ok(Some(false)),
			None => self.create_dir(rel, &dst),
			Some(EntryKind::Symlink) => {
				if let Err(e) = self.apply(|| file_ops::remove_file(&dst)) {
					self.fail(rel, e)?;
					return Ok(None);
				}
				self.emit(SyncEventKind::RemovedFile, rel);
				self.create_dir(rel, &dst)
			}
			Some(EntryKind::File) => match self.opts().kind_mismatch {
				KindMismatchPolicy::Skip => {
					self.fail(rel, conflict(rel, EntryKind::Directory, EntryKind::File))?;
					Ok(None)
				}
				KindMismatchPolicy::Replace => {
					if let Err(e) = self.apply(|| file_ops::remove_file(&dst)) {
						self.fail(rel, e)?;
						return Ok(None);
					}
					self.emit(SyncEventKind::RemovedFile, rel);
					self.create_dir(rel, &dst)
				}
			},
		}
	}

	fn create_dir(&mut self, rel: &Path, dst: &Path) -> Result<Option<bool>, SyncError> {
		match self.apply(|| file_ops::create_dir_all(dst)) {
			Ok(()) => {
				self.emit(SyncEventKind::CreatedDirectory, rel);
				Ok(Some(true))
			}
			Err(e) => {
				self.fail(rel, e)?;
				Ok(None)
			}
		}
	}

	// ------------------------------------------------------------------------
	// Removals
	// ------------------------------------------------------------------------

	fn remove_dir(&mut self, rel: &Path) -> Result<(), SyncError> {
		let listing = match tree::list_replica_dir(self.replica, rel) {
			Ok(l) => l,
			Err(e) => return self.fail(rel, e),
		};
		for (path, err) in listing.failures {
			self.fail(&path, err)?;
		}

		let (files, dirs): (Vec<TreeEntry>, Vec<TreeEntry>) = listing
			.entries
			.into_iter()
			.filter(|e| !self.excluded(e))
			.partition(|e| !e.is_dir());

		for file in &files {
			self.remove_file_if_orphaned(file)?;
		}
		for dir in &dirs {
			self.remove_dir_if_orphaned(dir)?;
		}
		Ok(())
	}

	/// Remove a replica file or link whose path the source no longer has
	fn remove_file_if_orphaned(&mut self, entry: &TreeEntry) -> Result<(), SyncError> {
		let rel = entry.relative_path.as_path();
		match self.source_kind_at(&entry.under(self.source)) {
			Ok(Some(EntryKind::Directory)) => {
				// Already reported (or replaced) by the additions phase
				debug!("Leaving {}: directory in source", rel.display());
				Ok(())
			}
			Ok(Some(_)) => Ok(()),
			Ok(None) => {
				let dst = entry.under(self.replica);
				match self.apply(|| file_ops::remove_file(&dst)) {
					Ok(()) => {
						self.emit(SyncEventKind::RemovedFile, rel);
						Ok(())
					}
					Err(e) => self.fail(rel, e),
				}
			}
			Err(e) => self.fail(rel, e),
		}
	}

	fn remove_dir_if_orphaned(&mut self, entry: &TreeEntry) -> Result<(), SyncError> {
		let rel = entry.relative_path.as_path();
		match self.source_kind_at(&entry.under(self.source)) {
			Ok(Some(EntryKind::Directory)) => self.remove_dir(rel),
			Ok(Some(_)) => {
				debug!("Leaving {}: file in source", rel.display());
				Ok(())
			}
			Ok(None) => {
				let dst = entry.under(self.replica);
				match self.apply(|| file_ops::remove_dir_all(&dst)) {
					Ok(()) => {
						self.emit(SyncEventKind::RemovedDirectory, rel);
						Ok(())
					}
					Err(e) => self.fail(rel, e),
				}
			}
			Err(e) => self.fail(rel, e),
		}
	}
}

fn conflict(rel: &Path, source_kind: EntryKind, replica_kind: EntryKind) -> SyncError {
	SyncError::StructuralConflict { path: rel.to_path_buf(), source_kind, replica_kind }
}

fn not_a_directory(role: RootRole, path: &Path) -> SyncError {
	SyncError::RootUnavailable {
		role,
		path: path.to_path_buf(),
		source: io::Error::new(io::ErrorKind::Other, "not a directory"),
	}
}


// vim: ts=4
