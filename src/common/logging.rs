//! Logging and tracing configuration
//!
//! Logs are controlled by the `RUST_LOG` environment variable. Default level
//! is INFO for this crate and WARN for dependencies; verbose runs raise the
//! crate to DEBUG so commands, RPC calls and poll iterations are visible.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
pub fn init_cli(verbose: bool) {
    let default_directive = if verbose {
        "system_test=debug,warn"
    } else {
        "system_test=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
