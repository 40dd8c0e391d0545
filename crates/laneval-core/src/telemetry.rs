//! Log subscriber setup for the `laneval` binary.
//!
//! stdout is reserved for the requirement summary and issue listings, so
//! every log line, plain or JSON, goes to stderr.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for a validation process.
///
/// `RUST_LOG` wins over `level` when set, e.g.
/// `RUST_LOG=laneval_core=debug` to see unresolved prerequisite names.
/// With `json`, each event (`validation.started`, `validator.skipped`, ...)
/// is one JSON object per line. A second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(stderr_layer.json()).try_init()
    } else {
        registry.with(stderr_layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_ignored() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::info!(event = "validation.started", "still logs after reinit");
    }
}
