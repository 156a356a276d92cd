//! Environment variable overrides for [`DiagnosticsConfig`].
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Environment variables**: `FAULTLINE_*` values
//! 2. **Programmatic**: fields set on the config before applying overrides
//! 3. **Defaults**: [`DiagnosticsConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `FAULTLINE_DISABLE` | `bool` | `enabled` (inverted) |
//! | `FAULTLINE_VERBOSITY` | `0..=3` | `verbosity` |
//! | `FAULTLINE_WINDOW_SECS` | `u64` | `window` |
//! | `FAULTLINE_WINDOW_CAP` | `u32` | `window_cap` |
//! | `FAULTLINE_FATAL_WARNINGS` | `bool` | `fatal_warnings` |
//! | `FAULTLINE_MAX_FRAMES` | `usize` | `max_frames` |

use crate::config::{DiagnosticsConfig, Verbosity};
use crate::error::ConfigError;
use std::time::Duration;

/// Environment variable disabling all diagnostic output.
pub const ENV_DISABLE: &str = "FAULTLINE_DISABLE";
/// Environment variable for the rendering verbosity level (0..=3).
pub const ENV_VERBOSITY: &str = "FAULTLINE_VERBOSITY";
/// Environment variable for the rate window length in seconds.
pub const ENV_WINDOW_SECS: &str = "FAULTLINE_WINDOW_SECS";
/// Environment variable for the per-window report cap.
pub const ENV_WINDOW_CAP: &str = "FAULTLINE_WINDOW_CAP";
/// Environment variable forcing warnings to behave fatally.
pub const ENV_FATAL_WARNINGS: &str = "FAULTLINE_FATAL_WARNINGS";
/// Environment variable for the captured frame cap.
pub const ENV_MAX_FRAMES: &str = "FAULTLINE_MAX_FRAMES";

/// Applies environment variable overrides to `config`.
///
/// Only variables present in the environment are applied. Returns an error
/// if a variable is set but unparseable; earlier overrides may already have
/// been applied at that point.
pub fn apply_env_overrides(config: &mut DiagnosticsConfig) -> Result<(), ConfigError> {
    if let Some(disabled) = read_bool(ENV_DISABLE)? {
        config.enabled = !disabled;
    }
    if let Some(value) = read_var(ENV_VERBOSITY) {
        let level: u8 = value
            .parse()
            .map_err(|_| invalid(ENV_VERBOSITY, &value))?;
        config.verbosity =
            Verbosity::from_level(level).ok_or_else(|| invalid(ENV_VERBOSITY, &value))?;
    }
    if let Some(value) = read_var(ENV_WINDOW_SECS) {
        let secs: u64 = value
            .parse()
            .map_err(|_| invalid(ENV_WINDOW_SECS, &value))?;
        config.window = Duration::from_secs(secs);
    }
    if let Some(value) = read_var(ENV_WINDOW_CAP) {
        config.window_cap = value
            .parse()
            .map_err(|_| invalid(ENV_WINDOW_CAP, &value))?;
    }
    if let Some(fatal) = read_bool(ENV_FATAL_WARNINGS)? {
        config.fatal_warnings = fatal;
    }
    if let Some(value) = read_var(ENV_MAX_FRAMES) {
        config.max_frames = value
            .parse()
            .map_err(|_| invalid(ENV_MAX_FRAMES, &value))?;
    }
    config.normalize();
    Ok(())
}

fn read_var(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn read_bool(var: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(value) = read_var(var) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(invalid(var, &value)),
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvValue {
        var,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::env_lock;

    fn clear_all() {
        for var in [
            ENV_DISABLE,
            ENV_VERBOSITY,
            ENV_WINDOW_SECS,
            ENV_WINDOW_CAP,
            ENV_FATAL_WARNINGS,
            ENV_MAX_FRAMES,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_overrides_apply_when_set() {
        crate::test_utils::init_test_logging();
        let _guard = env_lock();
        clear_all();
        std::env::set_var(ENV_VERBOSITY, "1");
        std::env::set_var(ENV_WINDOW_SECS, "60");
        std::env::set_var(ENV_WINDOW_CAP, "10");
        std::env::set_var(ENV_FATAL_WARNINGS, "true");

        let mut config = DiagnosticsConfig::default();
        apply_env_overrides(&mut config).expect("valid overrides");
        crate::assert_with_log!(
            config.verbosity == Verbosity::Addresses,
            "verbosity",
            Verbosity::Addresses,
            config.verbosity
        );
        crate::assert_with_log!(
            config.window == Duration::from_secs(60),
            "window",
            60u64,
            config.window.as_secs()
        );
        crate::assert_with_log!(config.window_cap == 10, "cap", 10u32, config.window_cap);
        crate::assert_with_log!(
            config.fatal_warnings,
            "fatal warnings",
            true,
            config.fatal_warnings
        );
        clear_all();
        crate::test_complete!("test_overrides_apply_when_set");
    }

    #[test]
    fn test_unset_variables_leave_defaults() {
        crate::test_utils::init_test_logging();
        let _guard = env_lock();
        clear_all();
        let mut config = DiagnosticsConfig::default();
        apply_env_overrides(&mut config).expect("no overrides set");
        crate::assert_with_log!(
            config.verbosity == Verbosity::Symbols,
            "default verbosity kept",
            Verbosity::Symbols,
            config.verbosity
        );
        crate::test_complete!("test_unset_variables_leave_defaults");
    }

    #[test]
    fn test_garbage_values_are_rejected() {
        crate::test_utils::init_test_logging();
        let _guard = env_lock();
        clear_all();
        std::env::set_var(ENV_VERBOSITY, "verbose");
        let mut config = DiagnosticsConfig::default();
        let err = apply_env_overrides(&mut config).expect_err("must reject");
        crate::assert_with_log!(
            err == ConfigError::InvalidEnvValue {
                var: ENV_VERBOSITY,
                value: "verbose".to_string()
            },
            "typed error",
            "InvalidEnvValue",
            format!("{err:?}")
        );
        clear_all();

        std::env::set_var(ENV_VERBOSITY, "7");
        let mut config = DiagnosticsConfig::default();
        let out_of_range = apply_env_overrides(&mut config);
        crate::assert_with_log!(
            out_of_range.is_err(),
            "out-of-range level rejected",
            true,
            out_of_range.is_err()
        );
        clear_all();
        crate::test_complete!("test_garbage_values_are_rejected");
    }

    #[test]
    fn test_disable_inverts_enabled() {
        crate::test_utils::init_test_logging();
        let _guard = env_lock();
        clear_all();
        std::env::set_var(ENV_DISABLE, "1");
        let mut config = DiagnosticsConfig::default();
        apply_env_overrides(&mut config).expect("valid");
        crate::assert_with_log!(!config.enabled, "disabled", false, config.enabled);
        clear_all();
        crate::test_complete!("test_disable_inverts_enabled");
    }
}
