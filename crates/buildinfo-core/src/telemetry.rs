//! Log output for the `buildinfo` binary and other embedders.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr subscriber; `RUST_LOG` overrides `level`.
///
/// Extraction results are printed on stdout, so log lines never go there.
/// A second call keeps the first subscriber.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let plain = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let structured = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .json();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with((!json).then_some(plain))
        .with(json.then_some(structured))
        .try_init();
}
