//! CloudStack API client implementation

use crate::signing::signed_query;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use types::{
    ApiErrorBody, CloudStackError, ListLoadBalancerRulesEnvelope, ListLoadBalancerRulesResponse,
    Result,
};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LIST_LOAD_BALANCER_RULES: &str = "listLoadBalancerRules";

/// HTTP client for a CloudStack management server
#[derive(Clone)]
pub struct CloudStackClient {
    api_url: String,
    api_key: String,
    secret_key: String,
    http_client: Client,
    timeout: Duration,
}

impl fmt::Debug for CloudStackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudStackClient")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Filters for `listLoadBalancerRules`
#[derive(Debug, Clone, Default)]
pub struct ListLoadBalancerRulesParams {
    /// Free-text match on rule name
    pub keyword: Option<String>,
    /// Restrict to a project
    pub project_id: Option<String>,
    /// List rules of every account the caller can see
    pub list_all: bool,
}

impl ListLoadBalancerRulesParams {
    fn into_params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(keyword) = self.keyword {
            params.push(("keyword", keyword));
        }
        if let Some(project_id) = self.project_id.filter(|id| !id.is_empty()) {
            params.push(("projectid", project_id));
        }
        if self.list_all {
            params.push(("listall", "true".to_string()));
        }
        params
    }
}

impl CloudStackClient {
    /// Create a new client. `verify_ssl = false` accepts any certificate.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        verify_ssl: bool,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("cloudstack-ccm/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| CloudStackError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            http_client,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// List load-balancer rules matching `params`
    pub async fn list_load_balancer_rules(
        &self,
        params: ListLoadBalancerRulesParams,
    ) -> Result<ListLoadBalancerRulesResponse> {
        let envelope: ListLoadBalancerRulesEnvelope =
            self.request(LIST_LOAD_BALANCER_RULES, &params.into_params()).await?;

        tracing::debug!(
            count = envelope.response.load_balancer_rules.len(),
            "Listed load balancer rules"
        );
        Ok(envelope.response)
    }

    /// Issue a signed API call and decode the JSON body
    pub async fn request<T: DeserializeOwned>(
        &self,
        command: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut all: BTreeMap<String, String> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        all.insert("apiKey".to_string(), self.api_key.clone());
        all.insert("command".to_string(), command.to_string());
        all.insert("response".to_string(), "json".to_string());

        let url = format!("{}?{}", self.api_url, signed_query(&all, &self.secret_key)?);

        tracing::debug!(command = command, api_url = %self.api_url, "Calling CloudStack API");

        let response = timeout(self.timeout, self.http_client.get(&url).send())
            .await
            .map_err(|_| CloudStackError::Timeout {
                command: command.to_string(),
            })?
            .map_err(|e| CloudStackError::Transport {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let raw_text = response.text().await.map_err(|e| CloudStackError::InvalidResponse {
            command: command.to_string(),
            message: format!("error reading response body: {}", e),
        })?;

        if !status.is_success() {
            let message = extract_error_text(&raw_text).unwrap_or_else(|| raw_text.clone());
            tracing::warn!(command = command, status = status.as_u16(), %message, "CloudStack API call failed");
            return Err(CloudStackError::Http {
                command: command.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&raw_text).map_err(|e| CloudStackError::InvalidResponse {
            command: command.to_string(),
            message: format!("{} | raw: {}", e, raw_text),
        })
    }
}

/// Pull `errortext` out of `{"<command>response": {"errorcode": .., "errortext": ..}}`
fn extract_error_text(raw_text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw_text).ok()?;
    let inner = value.as_object()?.values().next()?.clone();
    let body: ApiErrorBody = serde_json::from_value(inner).ok()?;
    if body.errortext.is_empty() {
        return None;
    }
    Some(format!("{} (errorcode {}, cserrorcode {})", body.errortext, body.errorcode, body.cserrorcode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> CloudStackClient {
        CloudStackClient::new(format!("{}/client/api", server.uri()), "key", "secret", true).unwrap()
    }

    #[tokio::test]
    async fn test_list_load_balancer_rules() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/client/api"))
            .and(query_param("command", "listLoadBalancerRules"))
            .and(query_param("keyword", "web"))
            .and(query_param("projectid", "p-1"))
            .and(query_param("listall", "true"))
            .and(query_param("response", "json"))
            .and(query_param("apiKey", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listloadbalancerrulesresponse": {
                    "count": 2,
                    "loadbalancerrule": [
                        { "id": "1", "name": "web-tcp-80", "publicip": "203.0.113.10", "publicport": "80" },
                        { "id": "2", "name": "web-tcp-443", "publicip": "203.0.113.10", "publicport": "443" }
                    ]
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let response = client
            .list_load_balancer_rules(ListLoadBalancerRulesParams {
                keyword: Some("web".to_string()),
                project_id: Some("p-1".to_string()),
                list_all: true,
            })
            .await
            .unwrap();

        assert_eq!(response.count, 2);
        assert_eq!(response.load_balancer_rules[1].name, "web-tcp-443");

        let requests = mock_server.received_requests().await.unwrap();
        let signature = requests[0]
            .url
            .query_pairs()
            .find(|(key, _)| key == "signature")
            .map(|(_, value)| value.into_owned());
        assert!(signature.is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_list_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/client/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listloadbalancerrulesresponse": {}
            })))
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server)
            .list_load_balancer_rules(ListLoadBalancerRulesParams::default())
            .await
            .unwrap();

        assert!(response.load_balancer_rules.is_empty());
    }

    #[test]
    fn test_empty_project_id_not_sent() {
        let params = ListLoadBalancerRulesParams {
            keyword: None,
            project_id: Some(String::new()),
            list_all: false,
        };
        assert!(params.into_params().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/client/api"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "listloadbalancerrulesresponse": {
                    "uuidList": [],
                    "errorcode": 401,
                    "errortext": "unable to verify user credentials and/or request signature"
                }
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .list_load_balancer_rules(ListLoadBalancerRulesParams::default())
            .await
            .unwrap_err();

        match err {
            CloudStackError::Http { status, message, .. } => {
                assert_eq!(status, 401);
                assert!(message.starts_with("unable to verify user credentials"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .list_load_balancer_rules(ListLoadBalancerRulesParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CloudStackError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "listloadbalancerrulesresponse": {} }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .with_timeout(Duration::from_millis(50))
            .list_load_balancer_rules(ListLoadBalancerRulesParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CloudStackError::Timeout { .. }));
    }

    #[test]
    fn test_debug_hides_keys() {
        let client = CloudStackClient::new("https://cs.example/client/api", "key-123", "secret-456", true).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("https://cs.example/client/api"));
        assert!(!debug.contains("key-123"));
        assert!(!debug.contains("secret-456"));
    }
}
