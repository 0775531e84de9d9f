use tracing_subscriber::EnvFilter;

const QUIET_CRATES: [&str; 2] = ["reqwest=warn", "hyper_util=warn"];

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn setup_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    for directive in QUIET_CRATES {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .try_init();
}
