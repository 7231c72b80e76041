//! Log output for the command line tool.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber printing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects between `info`
/// and `debug` for this crate.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "tile_stitch=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a second call, e.g. from tests, keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
