/// Tracing subscriber setup for the `dossier` binary.
///
/// Events go to stderr so stdout carries only command output. `RUST_LOG`
/// is honoured when neither `--quiet` nor `--verbose` is given; otherwise
/// the flag picks the level.
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Level used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "warn";

/// Builds the filter for the given verbosity flags.
pub fn filter(quiet: bool, verbose: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(quiet: bool, verbose: bool, colors: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(colors)
        .with_target(verbose);
    if tracing_subscriber::registry()
        .with(filter(quiet, verbose))
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
