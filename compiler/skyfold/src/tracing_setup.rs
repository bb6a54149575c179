//! Logging setup for the binary.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Nothing is installed when `RUST_LOG` is unset, so stdout and stderr
/// carry only records and script output. Enable with e.g.
/// `RUST_LOG=sky_loader=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
