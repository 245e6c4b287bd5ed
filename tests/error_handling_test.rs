/// Error handling tests - unavailable roots, invalid roots, entry failures
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use replicr::callbacks::CallbackBuilder;
use replicr::error::SyncError;
use replicr::strategies::ErrorPolicy;
use replicr::sync::SyncBuilder;
use replicr::types::{RootRole, SyncEventKind};

fn setup_roots() -> (TempDir, PathBuf, PathBuf) {
	let root = TempDir::new().unwrap();
	let src = root.path().join("src");
	let dst = root.path().join("dst");
	fs::create_dir(&src).unwrap();
	fs::create_dir(&dst).unwrap();
	(root, src, dst)
}

#[test]
fn test_missing_source_root_aborts_pass() {
	let (root, _src, dst) = setup_roots();
	fs::write(dst.join("precious"), "keep me").unwrap();

	let events = Arc::new(Mutex::new(0usize));
	let failures = Arc::new(Mutex::new(Vec::new()));
	let (e, f) = (events.clone(), failures.clone());
	let callbacks = CallbackBuilder::new()
		.on_event(move |_| *e.lock().unwrap() += 1)
		.on_pass_failed(move |err| f.lock().unwrap().push(err.to_string()))
		.build();

	let err = SyncBuilder::new()
		.source(root.path().join("vanished"))
		.replica(&dst)
		.callbacks(Box::new(callbacks))
		.run()
		.unwrap_err();

	assert!(matches!(err, SyncError::RootUnavailable { role: RootRole::Source, .. }));
	assert!(err.is_fatal());
	assert_eq!(*events.lock().unwrap(), 0);
	assert_eq!(failures.lock().unwrap().len(), 1);
	assert!(dst.join("precious").exists(), "replica must not be touched");
}

#[test]
fn test_source_root_is_a_file() {
	let (root, _src, dst) = setup_roots();
	let file = root.path().join("plain.txt");
	fs::write(&file, "not a dir").unwrap();

	let err = SyncBuilder::new().source(&file).replica(&dst).run().unwrap_err();
	assert!(matches!(err, SyncError::RootUnavailable { role: RootRole::Source, .. }));
	assert!(err.to_string().contains("not a directory"));
}

#[test]
fn test_identical_roots_rejected() {
	let (_root, src, _dst) = setup_roots();
	let err = SyncBuilder::new().source(&src).replica(&src).run().unwrap_err();
	assert!(matches!(err, SyncError::Validation(_)));
}

#[test]
fn test_nested_roots_rejected() {
	let (_root, src, dst) = setup_roots();

	let inside = src.join("backup");
	let err = SyncBuilder::new()
		.source(&src)
		.replica(&inside)
		.create_replica_root(true)
		.run()
		.unwrap_err();
	assert!(matches!(err, SyncError::Validation(_)));
	assert!(!inside.exists());

	let outer = dst.clone();
	fs::create_dir(dst.join("inner")).unwrap();
	let err = SyncBuilder::new().source(dst.join("inner")).replica(&outer).run().unwrap_err();
	assert!(matches!(err, SyncError::Validation(_)));
}

#[test]
fn test_failed_event_log_entry_format() {
	let (_root, src, dst) = setup_roots();
	fs::write(src.join("x"), "file").unwrap();
	fs::create_dir(dst.join("x")).unwrap();

	let report = SyncBuilder::new().source(&src).replica(&dst).run().unwrap();

	assert_eq!(report.errors, 1);
	let line = report.events[0].log_entry();
	assert!(line.starts_with("SYNC ERROR: x ("), "unexpected entry {}", line);
	assert!(line.ends_with(')'));
}

#[test]
fn test_continue_policy_keeps_going_after_conflict() {
	let (_root, src, dst) = setup_roots();
	fs::write(src.join("a"), "conflicting").unwrap();
	fs::create_dir(dst.join("a")).unwrap();
	fs::write(src.join("b"), "fine").unwrap();

	let report = SyncBuilder::new()
		.source(&src)
		.replica(&dst)
		.on_error(ErrorPolicy::Continue)
		.run()
		.unwrap();

	assert_eq!(report.errors, 1);
	assert_eq!(report.paths_of(&SyncEventKind::CopiedNew), vec![std::path::Path::new("b")]);
}

#[test]
fn test_abort_policy_returns_first_error() {
	let (_root, src, dst) = setup_roots();
	fs::write(src.join("a"), "conflicting").unwrap();
	fs::create_dir(dst.join("a")).unwrap();
	fs::write(src.join("b"), "never copied").unwrap();

	let err = SyncBuilder::new()
		.source(&src)
		.replica(&dst)
		.on_error(ErrorPolicy::Abort)
		.run()
		.unwrap_err();

	assert!(matches!(err, SyncError::StructuralConflict { .. }));
	assert!(!err.is_fatal());
	assert!(!dst.join("b").exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_skipped_with_subtree() {
	use std::os::unix::fs::PermissionsExt;

	let (_root, src, dst) = setup_roots();
	fs::create_dir(src.join("locked")).unwrap();
	fs::write(src.join("locked/inner.txt"), "hidden away").unwrap();
	fs::write(src.join("open.txt"), "o").unwrap();
	fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

	// Privileged users read through permission bits; nothing to test then
	if fs::read_dir(src.join("locked")).is_ok() {
		fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
		return;
	}

	let report = SyncBuilder::new().source(&src).replica(&dst).run();
	fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
	let report = report.unwrap();

	assert_eq!(report.errors, 1);
	assert!(dst.join("open.txt").exists());
	assert!(dst.join("locked").is_dir());
	assert!(!dst.join("locked/inner.txt").exists());
}

// vim: ts=4
