//! Utility modules for the binary

pub mod signals;

pub use signals::setup_signal_handlers;

// vim: ts=4
