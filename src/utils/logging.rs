//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Setup logging for the client.
///
/// `RUST_LOG` selects the level; without it only warnings and errors are
/// shown so they do not interleave with the interactive prompt.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
}

/// Raise the default level to `debug` for the whole crate (`-v`).
pub fn setup_verbose_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("rax_ftp_client=debug"))
        .init();
}
