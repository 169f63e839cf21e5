//! Kubernetes-facing service identity and load-balancer status

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The parts of a Kubernetes Service the provider needs to identify it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name
    pub name: String,
    /// Service namespace
    #[serde(default)]
    pub namespace: String,
    /// Service UID assigned by the API server
    #[serde(default)]
    pub uid: String,
    /// Service labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Service {
    /// Create a service reference in the `default` namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: "default".to_string(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// `namespace/name`, used in log fields
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Load-balancer status reported back to the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerStatus {
    /// Ingress points of the load balancer
    pub ingress: Vec<LoadBalancerIngress>,
}

/// A single ingress point of a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerIngress {
    /// Public IP address
    pub ip: String,
    /// Hostname, when the load balancer is published under a domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}
