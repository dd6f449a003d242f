//! Thin wrapper around `env_logger`, matching how the rest of the crate's
//! module-path-scoped `log` targets (e.g. `bluetti_rs::reader`) are expected
//! to be filtered by the caller via `RUST_LOG`.

use log::{debug, error, info, log_enabled, warn, Level};

/// Initialize the logger from the `RUST_LOG` environment variable. Safe to
/// call more than once; subsequent calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::try_init();
}

pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
