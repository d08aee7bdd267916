use tracing_subscriber::EnvFilter;

/// Default filter for the command line flags. `RUST_LOG` wins when set.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "snapurl=debug,info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Diagnostics go to stderr so stdout stays
/// clean for URLs and `--json` output.
pub fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
