//! Append-only event log
//!
//! Each entry is one line: a local wall-clock timestamp in `ctime` style,
//! a colon, and the entry text. The file (and its parent directory) is
//! created on first use and only ever appended to.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::callbacks::SyncCallbacks;
use crate::error::SyncError;
use crate::logging::*;
use crate::types::SyncEvent;

/// `ctime(3)`-style timestamp, e.g. `Sun Oct 18 20:27:01 2026`
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Durable sink for pass events, optionally echoed to stdout
pub struct EventLog {
	path: PathBuf,
	echo: bool,
}

impl EventLog {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), echo: true }
	}

	/// Also print every entry to stdout (on by default)
	pub fn echo(mut self, echo: bool) -> Self {
		self.echo = echo;
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Append one timestamped line
	pub fn append(&self, entry: &str) -> io::Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}

		let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
		let line = format!("{}: {}\n", Local::now().format(TIMESTAMP_FORMAT), entry);
		file.write_all(line.as_bytes())
	}

	fn record(&self, entry: &str) {
		if self.echo {
			println!("{}", entry);
		}
		if let Err(e) = self.append(entry) {
			warn!("Cannot append to event log {}: {}", self.path.display(), e);
		}
	}
}

impl SyncCallbacks for EventLog {
	fn on_event(&self, event: &SyncEvent) {
		self.record(&event.log_entry());
	}

	fn on_pass_failed(&self, error: &SyncError) {
		self.record(&format!("SYNC FAILED: {}", error));
	}
}


// vim: ts=4
