//! Provider construction

use crate::load_balancer::{CsLoadBalancer, LoadBalancer};
use cloudstack_client::CloudStackClient;
use config::{validate_credentials, ConfigLoader, CsConfig};
use std::io::Read;
use types::Result;

/// Name the provider registers under
pub const PROVIDER_NAME: &str = "cloudstack";

/// Capabilities a cloud provider can expose to the control plane
pub trait CloudProvider: Send + Sync {
    /// Registered provider name
    fn provider_name(&self) -> &str;

    /// Load-balancer capability, `None` when unsupported
    fn load_balancer(&self) -> Option<&dyn LoadBalancer>;

    /// Whether the provider has a cluster id configured
    fn has_cluster_id(&self) -> bool {
        false
    }
}

/// CloudStack implementation of [`CloudProvider`]
#[derive(Debug, Clone)]
pub struct CsCloud {
    config: CsConfig,
    client: CloudStackClient,
    load_balancer: CsLoadBalancer,
}

impl CsCloud {
    /// Build the provider from a resolved configuration.
    ///
    /// Fails when `api-url`, `api-key` or `secret-key` is still empty.
    pub fn new(config: CsConfig) -> Result<Self> {
        validate_credentials(&config)?;

        let global = &config.global;
        if global.ssl_no_verify {
            tracing::warn!(api_url = %global.api_url, "TLS certificate verification disabled");
        }

        let client = CloudStackClient::new(
            global.api_url.clone(),
            global.api_key.clone(),
            global.secret_key.clone(),
            !global.ssl_no_verify,
        )?;

        let load_balancer = CsLoadBalancer::new(
            client.clone(),
            global.project_id.clone(),
            global.lb_domain.clone(),
            global.service_filter_label.clone(),
        );

        tracing::info!(
            api_url = %global.api_url,
            project_id = %global.project_id,
            lb_domain = %global.lb_domain,
            "CloudStack provider initialized"
        );

        Ok(Self {
            config,
            client,
            load_balancer,
        })
    }

    /// Resolve a cloud-config stream and build the provider from it
    pub fn from_reader(source: Option<&mut dyn Read>) -> Result<Self> {
        let config = ConfigLoader::resolve(source)?;
        Self::new(config)
    }

    pub fn config(&self) -> &CsConfig {
        &self.config
    }

    pub fn client(&self) -> &CloudStackClient {
        &self.client
    }
}

impl CloudProvider for CsCloud {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn load_balancer(&self) -> Option<&dyn LoadBalancer> {
        Some(&self.load_balancer)
    }
}
