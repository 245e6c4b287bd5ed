//! # replicr - One-way Periodic Directory Mirroring
//!
//! replicr keeps a replica directory tree in agreement with a source tree.
//! Each pass lists both trees fresh, copies new and content-changed files
//! (compared by BLAKE3 digest, never by timestamp), creates missing
//! directories, and then deletes whatever the source no longer has.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let report = replicr::reconcile("./data", "./backup")?;
//! println!("{}", report);
//! ```
//!
//! ## Using the Builder Pattern
//!
//! ```rust,ignore
//! use replicr::sync::SyncBuilder;
//! use replicr::event_log::EventLog;
//!
//! let report = SyncBuilder::new()
//!     .source("./data")
//!     .replica("./backup")
//!     .exclude("**/*.tmp")
//!     .callbacks(Box::new(EventLog::new("sync.log")))
//!     .run()?;
//! ```

pub mod callbacks;
pub mod config;
pub mod error;
pub mod event_log;
pub mod exclusion;
pub mod file_ops;
pub mod hasher;
pub mod logging;
pub mod reconcile;
pub mod strategies;
pub mod sync;
pub mod tree;
pub mod types;
pub mod validation;

// Re-export commonly used types and functions
pub use callbacks::{CallbackBuilder, SyncCallbacks};
pub use config::Config;
pub use error::SyncError;
pub use event_log::EventLog;
pub use reconcile::{ReconcileOptions, Reconciler};
pub use strategies::{ErrorPolicy, KindMismatchPolicy};
pub use sync::{reconcile, SyncBuilder};
pub use types::{EntryKind, SyncEvent, SyncEventKind, SyncReport, TreeEntry};

// vim: ts=4
