//! CloudStack API payloads

use serde::{Deserialize, Serialize};

/// A load-balancer rule as returned by `listLoadBalancerRules`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub publicip: String,
    #[serde(default)]
    pub publicipid: String,
    #[serde(default)]
    pub publicport: String,
    #[serde(default)]
    pub privateport: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub projectid: String,
}

/// Body of the `listloadbalancerrulesresponse` object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLoadBalancerRulesResponse {
    /// Total number of rules, absent when the list is empty
    #[serde(default)]
    pub count: u32,
    #[serde(default, rename = "loadbalancerrule")]
    pub load_balancer_rules: Vec<LoadBalancerRule>,
}

/// Top-level envelope of a `listLoadBalancerRules` response
#[derive(Debug, Clone, Deserialize)]
pub struct ListLoadBalancerRulesEnvelope {
    #[serde(rename = "listloadbalancerrulesresponse")]
    pub response: ListLoadBalancerRulesResponse,
}

/// Error body CloudStack wraps in `<command>response` on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errorcode: i32,
    #[serde(default)]
    pub cserrorcode: i32,
    #[serde(default)]
    pub errortext: String,
}
