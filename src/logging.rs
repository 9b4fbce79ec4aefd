//! Console logging for the `tabmerge` binary.
//!
//! The library only emits through the `log` facade; this module wires it to
//! `env_logger`. `RUST_LOG` always wins over the verbosity flag:
//!
//! ```bash
//! RUST_LOG=tabmerge=debug tabmerge merge
//! ```

use anyhow::{Context as _, Result};
use env_logger::Env;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initializes the global logger. Call once at startup.
///
/// # Errors
///
/// Returns error if a logger is already installed.
pub fn init(verbosity: u8) -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter(verbosity)))
        .format_timestamp_millis()
        .try_init()
        .context("Failed to initialize logging")?;

    log::debug!("Logging initialized at verbosity {verbosity}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "info");
        assert_eq!(default_filter(1), "debug");
        assert_eq!(default_filter(5), "trace");
    }
}
