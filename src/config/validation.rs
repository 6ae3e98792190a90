use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid platform URL '{url}', expected 'http://' or 'https://'")]
    InvalidBaasUrl { url: String },

    #[error("Module request timeout must be positive")]
    InvalidModuleTimeout,

    #[error("max_body_bytes must be positive")]
    InvalidBodyLimit,

    #[error("Probe path must not be empty when filesystem_probe is enabled")]
    EmptyProbePath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_modules(config)?;
    validate_runtime(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_body_bytes == 0 {
        return Err(ValidationError::InvalidBodyLimit);
    }
    Ok(())
}

fn validate_modules(config: &Config) -> Result<(), ValidationError> {
    if let Some(ref url) = config.modules.baas_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidBaasUrl { url: url.clone() });
        }
    }

    if config.modules.request_timeout_ms == 0 {
        return Err(ValidationError::InvalidModuleTimeout);
    }

    Ok(())
}

fn validate_runtime(config: &Config) -> Result<(), ValidationError> {
    if config.runtime.filesystem_probe && config.runtime.probe_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyProbePath);
    }
    Ok(())
}
