//! Public library API
//!
//! [`reconcile`] runs a single pass with default settings. [`SyncBuilder`]
//! assembles a [`Reconciler`] from a [`Config`] plus extra filters and
//! callbacks, for callers that need more than the defaults.

use std::path::{Path, PathBuf};

use crate::callbacks::{CompositeCallbacks, SyncCallbacks};
use crate::config::Config;
use crate::error::SyncError;
use crate::exclusion::{EntryFilter, ExclusionEngine};
use crate::reconcile::Reconciler;
use crate::strategies::{ErrorPolicy, KindMismatchPolicy};
use crate::types::SyncReport;
use crate::validation::{ValidationError, Validator};

/// Run one pass mirroring `source` into `replica` with default settings
pub fn reconcile(source: impl AsRef<Path>, replica: impl AsRef<Path>) -> Result<SyncReport, SyncError> {
	Reconciler::from_config(&Config::default())?.reconcile(source.as_ref(), replica.as_ref())
}

/// Builder for configuring and running passes
///
/// # Example
///
/// ```rust,ignore
/// use replicr::sync::SyncBuilder;
///
/// let report = SyncBuilder::new()
///     .source("./data")
///     .replica("./backup")
///     .exclude("*.tmp")
///     .dry_run(true)
///     .run()?;
/// println!("{}", report);
/// ```
#[derive(Default)]
pub struct SyncBuilder {
	config: Config,
	filters: Vec<Box<dyn EntryFilter>>,
	callbacks: CompositeCallbacks,
}

impl SyncBuilder {
	/// Create a builder starting from default configuration
	pub fn new() -> Self {
		Self::default()
	}

	/// Start from an already layered configuration
	pub fn with_config(config: Config) -> Self {
		Self { config, ..Default::default() }
	}

	pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
		self.config.source = Some(path.into());
		self
	}

	pub fn replica(mut self, path: impl Into<PathBuf>) -> Self {
		self.config.replica = Some(path.into());
		self
	}

	/// Add a glob pattern excluded from both trees
	pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
		self.config.exclude_patterns.push(pattern.into());
		self
	}

	/// Add a glob pattern that overrides exclusions
	pub fn include(mut self, pattern: impl Into<String>) -> Self {
		self.config.include_patterns.push(pattern.into());
		self
	}

	/// Compare hidden files too instead of ignoring them
	pub fn include_hidden(mut self, include: bool) -> Self {
		self.config.skip_hidden = !include;
		self
	}

	pub fn dry_run(mut self, dry_run: bool) -> Self {
		self.config.dry_run = dry_run;
		self
	}

	pub fn follow_symlinks(mut self, follow: bool) -> Self {
		self.config.follow_symlinks = follow;
		self
	}

	pub fn kind_mismatch(mut self, policy: KindMismatchPolicy) -> Self {
		self.config.kind_mismatch = policy;
		self
	}

	pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
		self.config.on_error = policy;
		self
	}

	pub fn create_replica_root(mut self, create: bool) -> Self {
		self.config.create_replica_root = create;
		self
	}

	/// Add an extra exclusion rule on top of patterns and the hidden-file rule
	pub fn filter(mut self, filter: Box<dyn EntryFilter>) -> Self {
		self.filters.push(filter);
		self
	}

	/// Add an event receiver; several may be registered
	pub fn callbacks(mut self, callbacks: Box<dyn SyncCallbacks>) -> Self {
		self.callbacks = self.callbacks.push(callbacks);
		self
	}

	/// Validate the configuration and assemble a reconciler
	pub fn build(self) -> Result<Reconciler, SyncError> {
		self.config.validate()?;

		let mut engine = ExclusionEngine::new(&self.config.exclude_config())
			.map_err(|e| ValidationError::ConfigError(e.to_string()))?;
		for filter in self.filters {
			engine = engine.with_filter(filter);
		}

		let mut reconciler = Reconciler::new((&self.config).into()).with_filter(Box::new(engine));
		if !self.callbacks.is_empty() {
			reconciler = reconciler.with_callbacks(Box::new(self.callbacks));
		}
		Ok(reconciler)
	}

	/// Build and run a single pass over the configured roots
	pub fn run(self) -> Result<SyncReport, SyncError> {
		let source = required(&self.config.source, "source")?;
		let replica = required(&self.config.replica, "replica")?;
		self.build()?.reconcile(&source, &replica)
	}
}

fn required(path: &Option<PathBuf>, role: &str) -> Result<PathBuf, SyncError> {
	path.clone().ok_or_else(|| ValidationError::ConfigError(format!("No {} directory given", role)).into())
}


// vim: ts=4
