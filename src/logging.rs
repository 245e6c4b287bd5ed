//! Logging prelude module for convenient access to tracing macros.
//!
//! This module provides convenient re-exports of common tracing macros
//! to reduce verbosity and maintain consistency across the codebase.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("This is an info message");
//! warn!("This is a warning");
//! ```
//!
//! Diagnostics go to stderr through `tracing`. The durable record of what a
//! pass changed is the event log in [`crate::event_log`].

pub use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// `level` is used when `RUST_LOG` is not set:
///
/// ```bash
/// RUST_LOG=debug replicr src dst 10 sync.log
/// RUST_LOG=replicr::reconcile=trace replicr src dst 10 sync.log
/// ```
///
/// Calling this twice (e.g. from tests) is harmless; the second call is ignored.
pub fn init_tracing(level: &str) {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
		)
		.with_writer(std::io::stderr)
		.try_init();
}

/// Shift a level name by `verbosity` steps (positive is more verbose)
pub fn adjust_level(base: &str, verbosity: i8) -> &'static str {
	const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
	let current = LEVELS.iter().position(|l| l.eq_ignore_ascii_case(base)).unwrap_or(3) as i8;
	let idx = (current + verbosity).max(0).min(LEVELS.len() as i8 - 1);
	LEVELS[idx as usize]
}


// vim: ts=4
