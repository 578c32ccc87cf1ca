//! Tracing subscriber bootstrap for the demo binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a global subscriber reading `RUST_LOG` (default `info`),
/// with source file/line and elapsed-time annotations. Call once, at
/// process start.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let timer = fmt::time::uptime();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_timer(timer),
        )
        .with(filter)
        .init();
}
