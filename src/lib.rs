//! # Media Foldering
//!
//! Files photos and videos into a date-structured tree by when they were
//! captured.
//!
//! ## Core Philosophy
//! - **Never overwrite** - every destination is free before anything lands there
//! - **Never lose a file** - anything that cannot be dated still gets a home
//! - **Keep one copy** - content that is already filed is left in place
//!
//! ## Architecture
//! - `core` - Timestamp resolution, path allocation, duplicate detection and moves
//! - `config` - Settings file and its merge with command-line flags
//! - `events` - Event-driven progress reporting
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{FolderingError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// Called by the application entry point. `RUST_LOG` wins when set;
/// otherwise the level is `info`, or `debug` when `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
