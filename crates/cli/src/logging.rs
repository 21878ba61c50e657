use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the stderr subscriber. `RUST_LOG` wins over both arguments.
pub fn init_logging(verbosity: u8, trace_protocol: bool) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity, trace_protocol)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

/// Directive string for a verbosity level.
///
/// 0 keeps only warnings, 1 (`-v`) adds connection lifecycle, 2+ (`-vv`)
/// is debug everywhere. Frame bodies stay off unless `trace_protocol` is
/// set, whatever the verbosity.
pub fn filter_for(verbosity: u8, trace_protocol: bool) -> String {
	let base = match verbosity {
		0 => "warn,cdp::protocol=off",
		1 => "warn,cdp_cli=info,cdp_runtime=info,cdp::protocol=off",
		_ => "debug,cdp::protocol=off",
	};
	if trace_protocol {
		format!("{base},cdp::protocol=trace")
	} else {
		base.to_string()
	}
}
