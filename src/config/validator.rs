//! Configuration validator for memprobe
//!
//! Validates configuration values so bad bounds fail at startup instead of
//! mid-traversal.

use super::defaults::ALLOWED_SIZES;
use super::loader::{Config, ConfigError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_limits(config)?;
        Self::validate_target(config)?;
        Self::validate_types(config)?;
        Ok(())
    }

    fn validate_limits(config: &Config) -> Result<(), ConfigError> {
        if config.limits.max_search == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_search must be at least 1".to_string(),
            ));
        }
        if config.limits.max_print == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_print must be at least 1".to_string(),
            ));
        }
        if config.limits.max_regions == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_regions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_target(config: &Config) -> Result<(), ConfigError> {
        if !matches!(config.target.pointer_size, 4 | 8) {
            return Err(ConfigError::Invalid(format!(
                "target.pointer_size must be 4 or 8, got {}",
                config.target.pointer_size
            )));
        }
        config.target.layout().map(|_| ())
    }

    fn validate_types(config: &Config) -> Result<(), ConfigError> {
        for (field, value) in [
            ("types.list_link", &config.types.list_link),
            ("types.tree_link", &config.types.tree_link),
            ("types.scatter", &config.types.scatter),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// Validates an explicit `--size` argument against the accepted widths.
pub fn validate_size(size: usize) -> Result<(), ConfigError> {
    if ALLOWED_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "size must be one of {ALLOWED_SIZES:?}, got {size}"
        )))
    }
}

/// Convenience wrapper
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let mut config = Config::default();
        config.limits.max_search = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.limits.max_print = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_pointer_size_rejected() {
        let mut config = Config::default();
        config.target.pointer_size = 2;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_size_whitelist() {
        for size in [1, 2, 4, 8, 16, 32] {
            assert!(validate_size(size).is_ok());
        }
        assert!(validate_size(3).is_err());
        assert!(validate_size(64).is_err());
    }
}
