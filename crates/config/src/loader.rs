//! Configuration loader implementation

use crate::env::{fallback, EnvSource, ProcessEnv, ENV_API_KEY, ENV_API_URL, ENV_SECRET_KEY};
use crate::ini::IniDocument;
use crate::schema::CsConfig;
use figment::Figment;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use types::ConfigError;

/// Resolves cloud-config text and environment fallbacks into a [`CsConfig`]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve configuration from an optional INI stream and the process
    /// environment.
    ///
    /// `None` yields an all-default configuration before the environment
    /// fallback is applied. Required fields are not checked here; see
    /// [`crate::validate_credentials`].
    pub fn resolve(source: Option<&mut dyn Read>) -> Result<CsConfig, ConfigError> {
        Self::resolve_with_env(source, &ProcessEnv)
    }

    /// Resolve configuration reading fallbacks from `env`
    pub fn resolve_with_env(
        source: Option<&mut dyn Read>,
        env: &dyn EnvSource,
    ) -> Result<CsConfig, ConfigError> {
        let mut config = match source {
            None => CsConfig::default(),
            Some(reader) => {
                let mut text = String::new();
                reader
                    .read_to_string(&mut text)
                    .map_err(|e| ConfigError::ParseError(format!("failed to read configuration: {}", e)))?;
                Self::parse_str(&text)?
            }
        };

        Self::apply_env_fallback(&mut config, env);
        Ok(config)
    }

    /// Load configuration from string, without environment fallback
    pub fn parse_str(text: &str) -> Result<CsConfig, ConfigError> {
        let document = IniDocument::parse(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Figment::from(document)
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration from a file and the process environment
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<CsConfig, ConfigError> {
        Self::load_file_with_env(path, &ProcessEnv)
    }

    pub fn load_file_with_env<P: AsRef<Path>>(
        path: P,
        env: &dyn EnvSource,
    ) -> Result<CsConfig, ConfigError> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        debug!(path = %path.display(), "Reading cloud config");
        Self::resolve_with_env(Some(&mut file), env)
    }

    /// Write a template configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let mut config = CsConfig::default();
        config.global.api_url = "https://cloudstack.example.com/client/api".to_string();
        let path = path.as_ref();

        std::fs::write(path, config.to_ini()).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn apply_env_fallback(config: &mut CsConfig, env: &dyn EnvSource) {
        let global = &mut config.global;
        for (field, key) in [
            (&mut global.api_url, ENV_API_URL),
            (&mut global.api_key, ENV_API_KEY),
            (&mut global.secret_key, ENV_SECRET_KEY),
        ] {
            if fallback(field, env, key) {
                debug!(variable = key, "Filled configuration field from environment");
            }
        }
    }
}
