//! Configuration validation utilities

use crate::schema::CsConfig;
use types::ConfigError;

/// Check that the fields needed to talk to CloudStack are present.
///
/// Every missing field is reported in a single error.
pub fn validate_credentials(config: &CsConfig) -> Result<(), ConfigError> {
    let global = &config.global;
    let missing: Vec<String> = [
        ("api-url", &global.api_url),
        ("api-key", &global.api_key),
        ("secret-key", &global.secret_key),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field.to_string())
    .collect();

    if !missing.is_empty() {
        return Err(ConfigError::MissingFields { fields: missing });
    }

    if !is_http_url(&global.api_url) {
        return Err(ConfigError::InvalidValue {
            field: "api-url".to_string(),
            value: global.api_url.clone(),
        });
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &CsConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_global(config, &mut report);
        Self::validate_commands(config, &mut report);

        report
    }

    fn validate_global(config: &CsConfig, report: &mut ValidationReport) {
        let global = &config.global;

        if let Err(ConfigError::MissingFields { fields }) = validate_credentials(config) {
            for field in fields {
                report.add_error(&format!("global.{field}"), "Required field is empty");
            }
        } else if !is_http_url(&global.api_url) {
            report.add_error("global.api-url", "API URL must start with http:// or https://");
        }

        if global.ssl_no_verify {
            report.add_warning(
                "global.ssl-no-verify",
                "TLS certificate verification is disabled",
            );
        }

        if !global.lb_environment_id.is_empty() && global.lb_environment_id.parse::<u64>().is_err() {
            report.add_warning(
                "global.lb-environment-id",
                &format!("Expected a numeric environment id, got '{}'", global.lb_environment_id),
            );
        }

        if !global.node_name_label.is_empty() && global.node_filter_label.is_empty() {
            report.add_warning(
                "global.node-name-label",
                "node-name-label is set but node-label is empty",
            );
        }
    }

    fn validate_commands(config: &CsConfig, report: &mut ValidationReport) {
        if !config.has_custom_commands() {
            return;
        }

        if !config.command.associate_ip.is_empty() {
            report.add_warning(
                "custom-command.associate-ip",
                &format!("Using custom command '{}' to associate IPs", config.command.associate_ip),
            );
        }

        if !config.command.assign_networks.is_empty() {
            report.add_warning(
                "custom-command.assign-networks",
                &format!(
                    "Using custom command '{}' to assign networks",
                    config.command.assign_networks
                ),
            );
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}
