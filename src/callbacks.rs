//! Callback traits for event reporting
//!
//! The reconciler hands every applied mutation to a [`SyncCallbacks`]
//! implementation as soon as it is applied. The durable event log is one
//! such implementation; library users can plug in their own or build one
//! from closures with [`CallbackBuilder`].

use crate::error::SyncError;
use crate::types::{SyncEvent, SyncReport};

// Type aliases to reduce complexity
type EventFn = dyn Fn(&SyncEvent) + Send + Sync;
type CompleteFn = dyn Fn(&SyncReport) + Send + Sync;
type FailFn = dyn Fn(&SyncError) + Send + Sync;

/// Combined callback handler for all pass events
pub trait SyncCallbacks: Send + Sync {
	/// Called once per applied mutation or skipped entry failure
	fn on_event(&self, _event: &SyncEvent) {}

	/// Called when a pass finishes, successfully or with entry failures
	fn on_pass_complete(&self, _report: &SyncReport) {}

	/// Called when a pass is aborted (unavailable root, abort policy)
	fn on_pass_failed(&self, _error: &SyncError) {}
}

/// Default callback implementation that does nothing
pub struct NoCallbacks;

impl SyncCallbacks for NoCallbacks {}

/// Fans every call out to several handlers in order
#[derive(Default)]
pub struct CompositeCallbacks {
	handlers: Vec<Box<dyn SyncCallbacks>>,
}

impl CompositeCallbacks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(mut self, handler: Box<dyn SyncCallbacks>) -> Self {
		self.handlers.push(handler);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl SyncCallbacks for CompositeCallbacks {
	fn on_event(&self, event: &SyncEvent) {
		for h in &self.handlers {
			h.on_event(event);
		}
	}

	fn on_pass_complete(&self, report: &SyncReport) {
		for h in &self.handlers {
			h.on_pass_complete(report);
		}
	}

	fn on_pass_failed(&self, error: &SyncError) {
		for h in &self.handlers {
			h.on_pass_failed(error);
		}
	}
}

/// Builder for callbacks using function closures
#[derive(Default)]
pub struct CallbackBuilder {
	event: Option<Box<EventFn>>,
	complete: Option<Box<CompleteFn>>,
	failed: Option<Box<FailFn>>,
}

impl CallbackBuilder {
	/// Create a new callback builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Set event callback
	pub fn on_event<F>(mut self, callback: F) -> Self
	where
		F: Fn(&SyncEvent) + Send + Sync + 'static,
	{
		self.event = Some(Box::new(callback));
		self
	}

	/// Set pass-complete callback
	pub fn on_pass_complete<F>(mut self, callback: F) -> Self
	where
		F: Fn(&SyncReport) + Send + Sync + 'static,
	{
		self.complete = Some(Box::new(callback));
		self
	}

	/// Set pass-failed callback
	pub fn on_pass_failed<F>(mut self, callback: F) -> Self
	where
		F: Fn(&SyncError) + Send + Sync + 'static,
	{
		self.failed = Some(Box::new(callback));
		self
	}

	/// Build the callbacks
	pub fn build(self) -> FunctionCallbacks {
		FunctionCallbacks { event: self.event, complete: self.complete, failed: self.failed }
	}
}

/// Callback implementation using function closures
pub struct FunctionCallbacks {
	event: Option<Box<EventFn>>,
	complete: Option<Box<CompleteFn>>,
	failed: Option<Box<FailFn>>,
}

impl SyncCallbacks for FunctionCallbacks {
	fn on_event(&self, event: &SyncEvent) {
		if let Some(ref f) = self.event {
			f(event);
		}
	}

	fn on_pass_complete(&self, report: &SyncReport) {
		if let Some(ref f) = self.complete {
			f(report);
		}
	}

	fn on_pass_failed(&self, error: &SyncError) {
		if let Some(ref f) = self.failed {
			f(error);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::SyncEventKind;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};

	#[test]
	fn test_callback_builder() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let seen_clone = seen.clone();
		let completed = Arc::new(AtomicUsize::new(0));
		let completed_clone = completed.clone();

		let callbacks = CallbackBuilder::new()
			.on_event(move |e| seen_clone.lock().unwrap().push(e.log_entry()))
			.on_pass_complete(move |_| {
				completed_clone.fetch_add(1, Ordering::SeqCst);
			})
			.build();

		callbacks.on_event(&SyncEvent::new(SyncEventKind::RemovedFile, "x"));
		callbacks.on_pass_complete(&SyncReport::default());
		// No pass-failed handler set; must be a no-op
		callbacks.on_pass_failed(&SyncError::Other { message: "boom".into() });

		assert_eq!(*seen.lock().unwrap(), vec!["REMOVED FILE: x".to_string()]);
		assert_eq!(completed.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_composite_fans_out() {
		let count = Arc::new(AtomicUsize::new(0));
		let a = count.clone();
		let b = count.clone();

		let composite = CompositeCallbacks::new()
			.push(Box::new(
				CallbackBuilder::new()
					.on_event(move |_| {
						a.fetch_add(1, Ordering::SeqCst);
					})
					.build(),
			))
			.push(Box::new(
				CallbackBuilder::new()
					.on_event(move |_| {
						b.fetch_add(10, Ordering::SeqCst);
					})
					.build(),
			));

		composite.on_event(&SyncEvent::new(SyncEventKind::CopiedNew, "f"));
		assert_eq!(count.load(Ordering::SeqCst), 11);
		assert!(!composite.is_empty());
	}
}

// vim: ts=4
