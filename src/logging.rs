//! Tracing subscriber setup for the `epoch` binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset. `verbose` raises this
/// crate to `debug` regardless of the environment. Calling this twice is a
/// no-op for the second call.
pub fn init_logging(verbose: bool) {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    if verbose {
        if let Ok(directive) = "epoch=debug".parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    // Integration tests may install their own subscriber first.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
