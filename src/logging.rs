//! Tracing subscriber bootstrap
//!
//! The library only emits `tracing` events; hosts and test binaries call
//! [`init`] once to see them.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"luma_colstore=debug"`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("luma_colstore=debug");
        init("luma_colstore=trace");
        tracing::debug!("subscriber installed");
    }
}
