//! Logging setup.
//!
//! The engine logs through `tracing`. Deprecated template overrides are
//! reported on the `almanac::deprecated` target, so they can be filtered on
//! their own:
//!
//! ```bash
//! ALMANAC_LOG=warn,almanac::deprecated=off
//! ```

use tracing_subscriber::EnvFilter;

/// Environment variable read by [`init_logging`].
pub const LOG_ENV: &str = "ALMANAC_LOG";

/// Installs a formatting subscriber.
///
/// The filter comes from `ALMANAC_LOG` when set, otherwise from `default`
/// (e.g. `"info"`). Returns false if a global subscriber was already
/// installed, which is not an error: the host may own logging.
pub fn init_logging(default: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
