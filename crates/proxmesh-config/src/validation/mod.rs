//! Full configuration validation.
//!
//! Validates numeric ranges and required strings. Each section has its own
//! validator; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::ProxmeshConfig;
use proxmesh_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ProxmeshConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_server(&mut errors, config);
    sections::validate_proximity(&mut errors, config);
    sections::validate_movement(&mut errors, config);
    sections::validate_media(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
