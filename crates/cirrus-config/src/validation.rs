//! Full configuration validation.
//!
//! Validates numeric ranges and required strings, collecting every error.

use crate::schema::CirrusConfig;
use cirrus_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CirrusConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(&mut errors, "assistant.max_tokens", config.assistant.max_tokens, 256, 64000);
    validate_range(
        &mut errors,
        "assistant.max_tool_rounds",
        config.assistant.max_tool_rounds,
        1,
        100,
    );
    validate_not_blank(&mut errors, "assistant.model", &config.assistant.model);

    validate_not_blank(&mut errors, "aws.default_profile", &config.aws.default_profile);
    validate_not_blank(&mut errors, "aws.default_region", &config.aws.default_region);
    validate_range(
        &mut errors,
        "aws.request_timeout_secs",
        config.aws.request_timeout_secs,
        1,
        600,
    );

    if let Some(ref root) = config.files.sandbox_root {
        if !root.is_absolute() {
            errors.push(format!(
                "files.sandbox_root = {} must be an absolute path",
                root.display()
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_not_blank(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}
