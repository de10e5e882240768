use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose > 1)
		.try_init();
}

fn level(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

/// Dependencies stay at `warn` until `-vvv`.
fn default_directives(verbose: u8) -> String {
	let level = level(verbose);
	if verbose >= 3 {
		level.to_string()
	} else {
		format!("warn,vbchat={level}")
	}
}
