//! Diagnostic tracing for the almanac CLI.
//!
//! Traces go to stderr and are controlled by `RUST_LOG`. Stdout carries only
//! command output (the result JSON), so traces never mix into it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset and `--verbose` is not given.
const DEFAULT_FILTER: &str = "warn";
/// Filter used for `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "warn,almanac=debug";

/// Install the stderr subscriber.
///
/// `RUST_LOG` always wins; otherwise `verbose` selects pipeline debug traces.
///
/// # Example
/// ```bash
/// RUST_LOG=almanac=debug almanac process --date 2024-12-26
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
