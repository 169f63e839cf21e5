//! CloudStack cloud-controller command line entry point

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::{ConfigLoader, ConfigValidator, CsConfig};
use provider::{CloudProvider, CsCloud};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types::Service;

#[derive(Debug, Parser)]
#[command(name = "cloudstack-ccm", version, about = "CloudStack cloud provider for Kubernetes")]
struct Cli {
    /// Path to the INI cloud-config file; credentials fall back to
    /// CLOUDSTACK_API_URL, CLOUDSTACK_API_KEY and CLOUDSTACK_SECRET_KEY
    #[arg(long, env = "CLOUD_CONFIG")]
    cloud_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the configuration and construct the provider
    Check,
    /// Look up the load balancer of a service
    GetLoadBalancer {
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        service: String,
        #[arg(long, default_value = "default")]
        namespace: String,
        /// Service label as key=value, repeatable
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
    /// Write a template cloud-config file
    InitConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            eprintln!("Could not load .env file: {}", e);
        }
    }

    init_logging()?;

    let cli = Cli::parse();
    info!("Starting cloudstack-ccm v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::InitConfig { path } => {
            ConfigLoader::create_example(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote example configuration to {}", path.display());
        }
        Command::Check => {
            let cloud = build_provider(cli.cloud_config.as_deref())?;
            println!("{:#?}", cloud.config());
            println!("provider {} ready", cloud.provider_name());
        }
        Command::GetLoadBalancer {
            cluster,
            service,
            namespace,
            labels,
        } => {
            let cloud = build_provider(cli.cloud_config.as_deref())?;
            let service = labels
                .into_iter()
                .fold(Service::new(service).with_namespace(namespace), |s, (k, v)| {
                    s.with_label(k, v)
                });

            let lb = cloud
                .load_balancer()
                .ok_or_else(|| anyhow!("provider has no load-balancer capability"))?;
            let status = lb
                .get_load_balancer(&cluster, &service)
                .await
                .with_context(|| format!("Failed to get load balancer for {}", service.key()))?;

            let output = serde_json::json!({
                "name": lb.get_load_balancer_name(&service),
                "exists": status.is_some(),
                "status": status,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn build_provider(cloud_config: Option<&Path>) -> Result<CsCloud> {
    let config = load_config(cloud_config)?;
    CsCloud::new(config).context("Failed to construct CloudStack provider")
}

/// Resolve the cloud config and log validation findings
fn load_config(path: Option<&Path>) -> Result<CsConfig> {
    let config = match path {
        Some(path) => {
            let config = ConfigLoader::load_file(path)
                .with_context(|| format!("Failed to load cloud config {}", path.display()))?;
            info!("Configuration loaded from: {}", path.display());
            config
        }
        None => {
            info!("No cloud config given, using environment");
            ConfigLoader::resolve(None).context("Failed to resolve configuration")?
        }
    };

    let report = ConfigValidator::validate(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }
    for error in &report.errors {
        tracing::error!(field = %error.field, "{}", error.message);
    }
    if report.has_warnings() || report.has_errors() {
        warn!("{}", report.summary());
    } else {
        info!("{}", report.summary());
    }

    Ok(config)
}

fn parse_label(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Initialize logging based on environment variables
fn init_logging() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output on stdout stays machine readable
    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    if log_level == "trace" || log_level == "debug" {
        warn!("Debug/trace logging enabled - request URLs include the API key");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("tsuru.io/app-pool=gold").unwrap(),
            ("tsuru.io/app-pool".to_string(), "gold".to_string())
        );
        assert_eq!(parse_label("empty=").unwrap(), ("empty".to_string(), String::new()));
        assert!(parse_label("novalue").is_err());
        assert!(parse_label("=gold").is_err());
    }

    #[test]
    fn test_get_load_balancer_args() {
        let cli = Cli::try_parse_from([
            "cloudstack-ccm",
            "--cloud-config",
            "/etc/kubernetes/cloud.conf",
            "get-load-balancer",
            "--cluster",
            "testCluster",
            "--service",
            "web",
            "--label",
            "tsuru.io/app-pool=gold",
        ])
        .unwrap();

        assert_eq!(cli.cloud_config, Some(PathBuf::from("/etc/kubernetes/cloud.conf")));
        match cli.command {
            Command::GetLoadBalancer {
                cluster,
                namespace,
                labels,
                ..
            } => {
                assert_eq!(cluster, "testCluster");
                assert_eq!(namespace, "default");
                assert_eq!(labels.len(), 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[Global]\napi-url = https://cloudstack.url\napi-key = k\nsecret-key = s\n",
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.global.api_url, "https://cloudstack.url");
    }

    #[test]
    fn test_load_config_parse_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[Global\n").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("parse error"));
    }
}
