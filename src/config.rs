//! Tunable knobs for the probe subsystem.
//!
//! Only [`Config::capacity`] is expected to vary in practice, and then only
//! in tests — production embedders get [`Config::default`]. Keeping it as a
//! plain struct (rather than scattering constants through `job`/`pool`)
//! means tests can stand up an isolated [`crate::subsystem::Subsystem`] with
//! a tiny pool instead of fighting the process-wide singleton.
use std::time::Duration;

/// Default number of concurrent workers. Chosen so that a handful of
/// permanently stuck mounts degrade the subsystem without starving the
/// whole pool on the first hang.
pub const DEFAULT_CAPACITY: usize = 3;

/// Default timeout used by the CLI when the caller does not specify one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Maximum number of concurrent worker threads (`P` in the design doc).
    pub capacity: usize,
    /// Timeout applied when none is given explicitly.
    pub default_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: DEFAULT_CAPACITY,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_published_constants() {
        let config = Config::default();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.default_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn capacity_override_leaves_timeout_untouched() {
        let config = Config {
            capacity: 8,
            ..Config::default()
        };
        assert_eq!(config.capacity, 8);
        assert_eq!(config.default_timeout, DEFAULT_TIMEOUT);
    }
}
