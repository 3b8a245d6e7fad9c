//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CommandsConfig, HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_commands(&config.commands)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_commands(commands: &CommandsConfig) -> ConfigResult<()> {
    if commands.prefix.is_empty() {
        return Err(ConfigError::missing_field("commands.prefix"));
    }

    if commands.prefix.iter().any(str::is_empty) {
        return Err(ConfigError::validation("Command prefixes cannot be empty"));
    }

    if let Some(owner) = &commands.owner_id
        && owner.trim().is_empty()
    {
        return Err(ConfigError::validation(
            "commands.owner_id cannot be blank; omit it instead",
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|module| module.is_empty()) {
        return Err(ConfigError::validation("Log filter module names cannot be empty"));
    }

    Ok(())
}
