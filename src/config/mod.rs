//! Configuration module for memprobe
//!
//! Provides configuration loading, validation, and default settings.

pub mod defaults;
mod loader;
mod validator;

pub use loader::{
    Config, ConfigError, ConfigLoader, LimitsConfig, LoggingConfig, TargetConfig, TypesConfig,
};
pub use validator::{validate_config, validate_size, ConfigValidator};

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_module_exports() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());

        let result: ConfigResult<String> = Ok("test".to_string());
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_error_from_io() {
        use std::io;
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_error: ConfigError = io_error.into();
        assert!(matches!(config_error, ConfigError::Io(_)));
    }
}
