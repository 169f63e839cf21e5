//! Configuration schema definitions

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Value printed in place of secrets
const REDACTED: &str = "<redacted>";

/// Resolved cloud-provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsConfig {
    /// `[Global]` section
    #[serde(default, rename = "global")]
    pub global: GlobalConfig,
    /// `[custom-command]` section
    #[serde(default, rename = "custom-command")]
    pub command: CommandConfig,
}

/// Connection and load-balancer settings
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// CloudStack API endpoint
    pub api_url: String,
    /// API key, falls back to `CLOUDSTACK_API_KEY`
    pub api_key: String,
    /// Secret key, falls back to `CLOUDSTACK_SECRET_KEY`
    pub secret_key: String,
    /// Skip TLS certificate verification
    #[serde(deserialize_with = "deserialize_lenient_bool")]
    pub ssl_no_verify: bool,
    pub project_id: String,
    pub lb_environment_id: String,
    pub lb_domain: String,
    /// Label key a service must carry to be managed
    #[serde(rename = "service-label")]
    pub service_filter_label: String,
    #[serde(rename = "node-label")]
    pub node_filter_label: String,
    pub node_name_label: String,
}

/// Names of custom CloudStack commands used instead of the built-in ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CommandConfig {
    /// Command used to associate a public IP
    pub associate_ip: String,
    /// Command used to assign networks to a load balancer
    pub assign_networks: String,
}

impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("ssl_no_verify", &self.ssl_no_verify)
            .field("project_id", &self.project_id)
            .field("lb_environment_id", &self.lb_environment_id)
            .field("lb_domain", &self.lb_domain)
            .field("service_filter_label", &self.service_filter_label)
            .field("node_filter_label", &self.node_filter_label)
            .field("node_name_label", &self.node_name_label)
            .finish()
    }
}

fn redact(secret: &str) -> &str {
    if secret.is_empty() {
        ""
    } else {
        REDACTED
    }
}

impl CsConfig {
    /// Render the configuration as INI text, secrets included.
    ///
    /// Values containing characters the reader treats specially are quoted.
    pub fn to_ini(&self) -> String {
        let g = &self.global;
        let mut out = String::from("[Global]\n");
        let global = [
            ("api-url", g.api_url.as_str()),
            ("api-key", g.api_key.as_str()),
            ("secret-key", g.secret_key.as_str()),
            ("ssl-no-verify", if g.ssl_no_verify { "true" } else { "false" }),
            ("project-id", g.project_id.as_str()),
            ("lb-environment-id", g.lb_environment_id.as_str()),
            ("lb-domain", g.lb_domain.as_str()),
            ("service-label", g.service_filter_label.as_str()),
            ("node-label", g.node_filter_label.as_str()),
            ("node-name-label", g.node_name_label.as_str()),
        ];
        for (key, value) in global {
            out.push_str(&format!("{} = {}\n", key, ini_value(value)));
        }

        out.push_str("\n[custom-command]\n");
        for (key, value) in [
            ("associate-ip", self.command.associate_ip.as_str()),
            ("assign-networks", self.command.assign_networks.as_str()),
        ] {
            out.push_str(&format!("{} = {}\n", key, ini_value(value)));
        }
        out
    }

    /// Whether any custom command overrides are configured
    pub fn has_custom_commands(&self) -> bool {
        !self.command.associate_ip.is_empty() || !self.command.assign_networks.is_empty()
    }
}

/// Values are written unquoted; `;` and `#` only start comments at the
/// beginning of a line, so they need no escaping.
fn ini_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parse a boolean token, treating anything unrecognised as `false`.
///
/// Deployments rely on a missing or garbled `ssl-no-verify` meaning "verify
/// certificates", so this never fails.
pub fn parse_bool_lenient(value: &str) -> bool {
    parse_bool(value).unwrap_or(false)
}

/// Strict boolean token parser
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" => Some(true),
        "0" | "f" | "F" => Some(false),
        other => match other.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => None,
        },
    }
}

fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientBool;

    impl<'de> de::Visitor<'de> for LenientBool {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean token")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v == 1)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v == 1)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(parse_bool_lenient(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(LenientBool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_empty() {
        let config = CsConfig::default();
        assert!(config.global.api_url.is_empty());
        assert!(config.global.api_key.is_empty());
        assert!(config.global.secret_key.is_empty());
        assert!(!config.global.ssl_no_verify);
        assert!(config.global.lb_environment_id.is_empty());
        assert!(config.command.associate_ip.is_empty());
        assert!(!config.has_custom_commands());
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["1", "t", "T", "true", "TRUE", "True", "yes", "on", " true "] {
            assert_eq!(parse_bool(token), Some(true), "{token}");
        }
        for token in ["0", "f", "F", "false", "FALSE", "False", "no", "off"] {
            assert_eq!(parse_bool(token), Some(false), "{token}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_unparseable_bool_is_silently_false() {
        // Surprising but relied upon: garbage never enables ssl-no-verify and never errors.
        assert!(!parse_bool_lenient("yes please"));
        assert!(!parse_bool_lenient(""));
        assert!(!parse_bool_lenient("2"));
        assert!(parse_bool_lenient("true"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = CsConfig::default();
        config.global.api_url = "https://cloudstack.url".to_string();
        config.global.api_key = "a-valid-api-key".to_string();
        config.global.secret_key = "a-valid-secret-key".to_string();

        let debug = format!("{config:?}");
        assert!(debug.contains("https://cloudstack.url"));
        assert!(debug.contains(REDACTED));
        assert!(!debug.contains("a-valid-api-key"));
        assert!(!debug.contains("a-valid-secret-key"));
    }

    #[test]
    fn test_to_ini_writes_plain_values() {
        let mut config = CsConfig::default();
        config.global.api_url = "https://cloudstack.url".to_string();
        config.global.lb_domain = "a;b".to_string();
        config.command.associate_ip = "acquireIP".to_string();

        let ini = config.to_ini();
        assert!(ini.contains("api-url = https://cloudstack.url\n"));
        assert!(ini.contains("lb-domain = a;b\n"));
        assert!(ini.contains("ssl-no-verify = false\n"));
        assert!(ini.contains("[custom-command]\nassociate-ip = acquireIP\n"));
    }
}
