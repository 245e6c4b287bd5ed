use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use replicr::config::Config;
use replicr::event_log::EventLog;
use replicr::logging::*;
use replicr::reconcile::Reconciler;
use replicr::strategies::{ErrorPolicy, KindMismatchPolicy};
use replicr::validation::{self, Validator};

mod utils;

fn cli() -> Command {
	Command::new("replicr")
		.version(env!("CARGO_PKG_VERSION"))
		.about("One-way periodic directory mirroring")
		.arg(Arg::new("source").value_name("SOURCE").help("Directory to mirror from"))
		.arg(Arg::new("replica").value_name("REPLICA").help("Directory kept identical to SOURCE"))
		.arg(
			Arg::new("interval")
				.value_name("INTERVAL")
				.value_parser(value_parser!(u64))
				.help("Seconds between passes (0 runs them back to back)"),
		)
		.arg(Arg::new("log_file").value_name("LOG_FILE").help("Append-only event log"))
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("TOML or JSON5 configuration file"),
		)
		.arg(
			Arg::new("print_config")
				.long("print-config")
				.action(ArgAction::SetTrue)
				.help("Print the effective configuration as JSON and exit"),
		)
		.arg(Arg::new("once").long("once").action(ArgAction::SetTrue).help("Run a single pass and exit"))
		.arg(
			Arg::new("dry_run")
				.short('n')
				.long("dry-run")
				.action(ArgAction::SetTrue)
				.help("Report what would change without touching the replica"),
		)
		.arg(
			Arg::new("exclude")
				.short('e')
				.long("exclude")
				.value_name("GLOB")
				.action(ArgAction::Append)
				.help("Leave matching paths out of both trees (repeatable)"),
		)
		.arg(
			Arg::new("include_hidden")
				.long("include-hidden")
				.action(ArgAction::SetTrue)
				.help("Mirror hidden files too"),
		)
		.arg(
			Arg::new("follow_symlinks")
				.long("follow-symlinks")
				.action(ArgAction::SetTrue)
				.help("Descend into directory links in the source"),
		)
		.arg(
			Arg::new("kind_mismatch")
				.long("kind-mismatch")
				.value_name("POLICY")
				.help("File/directory disagreement handling: skip or replace"),
		)
		.arg(
			Arg::new("on_error")
				.long("on-error")
				.value_name("POLICY")
				.help("Per-entry failure handling: continue or abort"),
		)
		.arg(
			Arg::new("create_replica")
				.long("create-replica")
				.action(ArgAction::SetTrue)
				.help("Create a missing replica root instead of failing"),
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::Count)
				.help("More diagnostics (repeatable)"),
		)
		.arg(
			Arg::new("quiet")
				.short('q')
				.long("quiet")
				.action(ArgAction::Count)
				.help("Fewer diagnostics (repeatable)"),
		)
}

/// Defaults, then config file, then environment, then command line
fn load_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
	let mut config = match matches.get_one::<String>("config") {
		Some(path) => Config::from_file(Path::new(path))?,
		None => Config::default(),
	};
	config.apply_env()?;

	if let Some(source) = matches.get_one::<String>("source") {
		config.source = Some(PathBuf::from(source));
	}
	if let Some(replica) = matches.get_one::<String>("replica") {
		config.replica = Some(PathBuf::from(replica));
	}
	if let Some(interval) = matches.get_one::<u64>("interval") {
		config.interval_secs = *interval;
	}
	if let Some(log_file) = matches.get_one::<String>("log_file") {
		config.log_file = PathBuf::from(log_file);
	}
	if let Some(patterns) = matches.get_many::<String>("exclude") {
		config.exclude_patterns.extend(patterns.cloned());
	}
	if let Some(policy) = matches.get_one::<String>("kind_mismatch") {
		config.kind_mismatch = policy.parse::<KindMismatchPolicy>()?;
	}
	if let Some(policy) = matches.get_one::<String>("on_error") {
		config.on_error = policy.parse::<ErrorPolicy>()?;
	}
	if matches.get_flag("dry_run") {
		config.dry_run = true;
	}
	if matches.get_flag("include_hidden") {
		config.skip_hidden = false;
	}
	if matches.get_flag("follow_symlinks") {
		config.follow_symlinks = true;
	}
	if matches.get_flag("create_replica") {
		config.create_replica_root = true;
	}

	let verbosity = matches.get_count("verbose") as i8 - matches.get_count("quiet") as i8;
	config.log_level = adjust_level(&config.log_level, verbosity).to_string();

	config.validate()?;
	Ok(config)
}

async fn run() -> Result<i32, Box<dyn Error>> {
	let matches = match cli().try_get_matches() {
		Ok(m) => m,
		Err(e) => {
			// --help and --version land here too
			let _ = e.print();
			return Ok(if e.use_stderr() { 1 } else { 0 });
		}
	};

	let config = load_config(&matches)?;
	if matches.get_flag("print_config") {
		println!("{}", serde_json::to_string_pretty(&config)?);
		return Ok(0);
	}

	init_tracing(&config.log_level);
	utils::setup_signal_handlers();

	let source = config.source.clone().ok_or("SOURCE directory is required")?;
	let replica = config.replica.clone().ok_or("REPLICA directory is required")?;
	validation::validate_roots(&source, &replica)?;

	let once = matches.get_flag("once");
	let interval = Duration::from_secs(config.interval_secs);
	let reconciler = Arc::new(
		Reconciler::from_config(&config)?.with_callbacks(Box::new(EventLog::new(&config.log_file))),
	);

	info!(
		"Mirroring {} -> {} every {}s, logging to {}{}",
		source.display(),
		replica.display(),
		config.interval_secs,
		config.log_file.display(),
		if config.dry_run { " (dry run)" } else { "" }
	);

	loop {
		let worker = reconciler.clone();
		let (src, dst) = (source.clone(), replica.clone());
		let result = tokio::task::spawn_blocking(move || worker.reconcile(&src, &dst)).await?;

		if once {
			let clean = matches!(&result, Ok(report) if !report.has_errors());
			return Ok(if clean { 0 } else { 1 });
		}
		if let Err(e) = result {
			// Already logged; a root may come back before the next pass
			debug!("Pass failed, retrying in {}s: {}", config.interval_secs, e);
		}

		tokio::time::sleep(interval).await;
	}
}

#[tokio::main]
async fn main() {
	let code = match run().await {
		Ok(code) => code,
		Err(e) => {
			eprintln!("replicr: {}", e);
			1
		}
	};
	std::process::exit(code);
}

// vim: ts=4
