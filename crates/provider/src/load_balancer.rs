//! Load-balancer capability backed by CloudStack load-balancer rules

use async_trait::async_trait;
use cloudstack_client::{CloudStackClient, ListLoadBalancerRulesParams};
use types::{LoadBalancerIngress, LoadBalancerRule, LoadBalancerStatus, Result, Service};

/// Load-balancer operations exposed to the control plane
#[async_trait]
pub trait LoadBalancer: Send + Sync {
    /// Current status of the service's load balancer.
    ///
    /// `Ok(None)` means the load balancer does not exist.
    async fn get_load_balancer(
        &self,
        cluster_name: &str,
        service: &Service,
    ) -> Result<Option<LoadBalancerStatus>>;

    /// Name the load balancer of `service` is known by
    fn get_load_balancer_name(&self, service: &Service) -> String;
}

/// [`LoadBalancer`] implementation over `listLoadBalancerRules`
#[derive(Debug, Clone)]
pub struct CsLoadBalancer {
    client: CloudStackClient,
    project_id: String,
    lb_domain: String,
    service_filter_label: String,
}

impl CsLoadBalancer {
    pub fn new(
        client: CloudStackClient,
        project_id: impl Into<String>,
        lb_domain: impl Into<String>,
        service_filter_label: impl Into<String>,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            lb_domain: lb_domain.into(),
            service_filter_label: service_filter_label.into(),
        }
    }

    /// Services without the configured filter label are left alone
    fn manages(&self, service: &Service) -> bool {
        self.service_filter_label.is_empty() || service.labels.contains_key(&self.service_filter_label)
    }

    fn status_from_rules(&self, lb_name: &str, rules: &[LoadBalancerRule]) -> LoadBalancerStatus {
        let hostname = (!self.lb_domain.is_empty()).then(|| lb_name.to_string());
        let mut ingress: Vec<LoadBalancerIngress> = Vec::new();

        for rule in rules {
            if rule.publicip.is_empty() || ingress.iter().any(|i| i.ip == rule.publicip) {
                continue;
            }
            ingress.push(LoadBalancerIngress {
                ip: rule.publicip.clone(),
                hostname: hostname.clone(),
            });
        }

        if ingress.len() > 1 {
            let ips: Vec<&str> = ingress.iter().map(|i| i.ip.as_str()).collect();
            tracing::warn!(
                load_balancer = %lb_name,
                ips = ?ips,
                "Load balancer rules point at different public IPs"
            );
        }

        LoadBalancerStatus { ingress }
    }
}

/// Rule names are `<lb name>` or `<lb name>-<suffix>`
fn rule_belongs_to(rule_name: &str, lb_name: &str) -> bool {
    match rule_name.strip_prefix(lb_name) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

#[async_trait]
impl LoadBalancer for CsLoadBalancer {
    async fn get_load_balancer(
        &self,
        cluster_name: &str,
        service: &Service,
    ) -> Result<Option<LoadBalancerStatus>> {
        if !self.manages(service) {
            tracing::debug!(
                cluster = cluster_name,
                service = %service.key(),
                label = %self.service_filter_label,
                "Service lacks filter label, not managed"
            );
            return Ok(None);
        }

        let lb_name = self.get_load_balancer_name(service);
        let response = self
            .client
            .list_load_balancer_rules(ListLoadBalancerRulesParams {
                keyword: Some(lb_name.clone()),
                project_id: Some(self.project_id.clone()),
                list_all: true,
            })
            .await?;

        let rules: Vec<LoadBalancerRule> = response
            .load_balancer_rules
            .into_iter()
            .filter(|rule| rule_belongs_to(&rule.name, &lb_name))
            .collect();

        if rules.is_empty() {
            tracing::debug!(
                cluster = cluster_name,
                service = %service.key(),
                load_balancer = %lb_name,
                "Load balancer does not exist"
            );
            return Ok(None);
        }

        tracing::info!(
            cluster = cluster_name,
            service = %service.key(),
            load_balancer = %lb_name,
            rules = rules.len(),
            "Found load balancer"
        );
        Ok(Some(self.status_from_rules(&lb_name, &rules)))
    }

    fn get_load_balancer_name(&self, service: &Service) -> String {
        if self.lb_domain.is_empty() {
            service.name.clone()
        } else {
            format!("{}.{}", service.name, self.lb_domain)
        }
    }
}
