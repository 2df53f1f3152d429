//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Env var holding a tracing filter directive (e.g. `hostedit=debug`).
pub const LOG_ENV: &str = "HOSTEDIT_LOG";

/// Initialize stderr logging. Call once, before any tracing macros fire.
///
/// `verbose` forces `debug` for this crate regardless of HOSTEDIT_LOG.
pub fn init(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("warn,hostedit=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
