//! Configuration errors.
//!
//! Relocation itself never fails: every operation is a local, deterministic mutation of
//! simulation state, and residual distance is a measured result. The only failures are
//! misconfigurations, which are fatal and surfaced the first time they are observed.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("no body configured for relocation")]
    MissingBody,

    #[error("no relocation strategy selected")]
    UnsetStrategy,

    #[error("fixed step duration must be positive and finite, got {0}")]
    NonPositiveStep(f32),
}

/// Shorthand result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fails unless `dt` is a usable fixed step duration.
pub fn validate_step(dt: f32) -> ConfigResult<f32> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(ConfigError::NonPositiveStep(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_step_is_accepted() {
        assert_eq!(validate_step(0.02), Ok(0.02));
    }

    #[test]
    fn zero_negative_and_nan_steps_are_rejected() {
        assert_eq!(validate_step(0.0), Err(ConfigError::NonPositiveStep(0.0)));
        assert_eq!(validate_step(-1.0), Err(ConfigError::NonPositiveStep(-1.0)));
        assert!(validate_step(f32::NAN).is_err());
        assert!(validate_step(f32::INFINITY).is_err());
    }
}
