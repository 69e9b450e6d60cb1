//! Configuration validation.

use crate::config::Config;
use crate::constants::{w64, wav};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_jitter_threshold(config.extract.jitter_threshold)?;
    if let Some(cap) = config.extract.max_segment_size {
        validate_max_segment_size(cap)?;
    }
    Ok(())
}

/// Validate a timing tolerance in seconds.
pub fn validate_jitter_threshold(value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!("jitter_threshold must be a positive number of seconds, got {value}"),
        });
    }
    Ok(())
}

/// Validate a segment size cap; it must leave room for audio after the
/// largest header.
pub fn validate_max_segment_size(value: u64) -> Result<()> {
    let minimum = w64::HEADER_SIZE.max(wav::HEADER_SIZE);
    if value <= minimum {
        return Err(Error::ConfigValidation {
            message: format!("max_segment_size must exceed {minimum} bytes, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_non_positive_threshold() {
        let mut config = Config::default();
        config.extract.jitter_threshold = 0.0;
        assert!(validate_config(&config).is_err());

        config.extract.jitter_threshold = -0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_nan_threshold() {
        let mut config = Config::default();
        config.extract.jitter_threshold = f64::NAN;
        let result = validate_config(&config);
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_validate_tiny_segment_size() {
        let mut config = Config::default();
        config.extract.max_segment_size = Some(104);
        assert!(validate_config(&config).is_err());

        config.extract.max_segment_size = Some(105);
        assert!(validate_config(&config).is_ok());
    }
}
