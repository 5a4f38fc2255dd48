//! Logger setup shared by the Hiroba binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter used by [`setup_logger`].
///
/// `RUST_LOG` wins when it is set. Otherwise the given crate gets
/// `default_level` and everything else stays at `warn`.
pub fn build_env_filter(crate_name: &str, default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let target = crate_name.replace('-', "_");
        EnvFilter::new(format!("warn,{target}={default_level}"))
    })
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so that stdout stays free for the terminal view.
///
/// # Arguments
///
/// * `crate_name` - Binary or crate name used as the filter target
/// * `default_level` - Level applied to `crate_name` when `RUST_LOG` is unset
pub fn setup_logger(crate_name: &str, default_level: &str) {
    let filter = build_env_filter(crate_name, default_level);

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
