use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: `RUST_LOG` if set, `nfe_report=info`
/// otherwise. Logs go to stderr so report previews on stdout stay clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nfe_report=info"));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // Ignore the error if a subscriber is already set (tests, embedding).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
