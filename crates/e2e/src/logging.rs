//! Log setup for test binaries and harnesses

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to `info`
/// for the page objects. Safe to call from every test; only the first call
/// installs anything.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ngx_pilot_e2e=info,ngx_pilot_driver=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
