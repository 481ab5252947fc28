use super::{AppConfig, ConfigError};

/// Validate the full application config, returning an error if any rule is
/// violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is
/// violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_server(config)?;
    validate_upstream(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_server(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.timeout == 0 {
        return Err(validation_err("server.timeout must be greater than 0"));
    }
    Ok(())
}

fn validate_upstream(config: &AppConfig) -> Result<(), ConfigError> {
    let upstream = &config.upstream;
    if upstream.base_url.is_empty() {
        return Err(validation_err("upstream.base_url is required"));
    }
    if upstream.api_key.is_empty() {
        return Err(validation_err("upstream.api_key is required"));
    }

    if upstream.is_azure() {
        if upstream
            .azure_api_version
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(validation_err(
                "upstream.azure_api_version is required for an Azure deployment",
            ));
        }
    } else if upstream.model.is_empty() {
        return Err(validation_err(
            "upstream.model is required for a standard backend",
        ));
    }
    Ok(())
}
