use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Media server section exists (enforced by serde) and has a URL
/// - Server port is not 0
/// - Extraction concurrency is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.media_server.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "media_server.url cannot be empty".to_string(),
        ));
    }

    if config.extract.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "extract.max_concurrent must be at least 1".to_string(),
        ));
    }

    Ok(())
}
