//! Signal handlers for graceful termination

use tracing::{debug, warn};

/// Exit code for a process stopped by SIGINT (128 + 2)
pub const EXIT_SIGINT: i32 = 130;
/// Exit code for a process stopped by SIGTERM (128 + 15)
pub const EXIT_SIGTERM: i32 = 143;

/// Exit the process on SIGINT or SIGTERM
///
/// A copy in flight is abandoned mid-write; it only ever touches its
/// temporary file, which the next pass removes.
pub fn setup_signal_handlers() {
	tokio::spawn(async {
		use tokio::signal;

		let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
				return;
			}
		};

		let mut sigint = match signal::unix::signal(signal::unix::SignalKind::interrupt()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
				return;
			}
		};

		tokio::select! {
			_ = sigterm.recv() => {
				debug!("Received SIGTERM, stopping");
				std::process::exit(EXIT_SIGTERM);
			}
			_ = sigint.recv() => {
				debug!("Received SIGINT, stopping");
				std::process::exit(EXIT_SIGINT);
			}
		}
	});
}

// vim: ts=4
