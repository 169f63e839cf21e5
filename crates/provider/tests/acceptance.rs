//! Acceptance tests against a live CloudStack environment.
//!
//! Set `CS_API_URL`, `CS_API_KEY` and `CS_SECRET_KEY` (optionally
//! `CS_PROJECT_ID` and `CS_SSL_NO_VERIFY`) to run them; otherwise they are
//! skipped.

use config::CsConfig;
use provider::{CloudProvider, CsCloud};
use std::env;
use types::Service;

const TEST_CLUSTER_NAME: &str = "testCluster";

/// Build a config straight from the environment, and whether it has enough
/// to connect.
fn config_from_env() -> (CsConfig, bool) {
    let var = |key: &str| env::var(key).unwrap_or_default();

    let mut cfg = CsConfig::default();
    cfg.global.api_url = var("CS_API_URL");
    cfg.global.api_key = var("CS_API_KEY");
    cfg.global.secret_key = var("CS_SECRET_KEY");
    cfg.global.project_id = var("CS_PROJECT_ID");
    cfg.global.ssl_no_verify = ssl_no_verify_from_env(&var("CS_SSL_NO_VERIFY"));

    let ok = !cfg.global.api_url.is_empty()
        && !cfg.global.api_key.is_empty()
        && !cfg.global.secret_key.is_empty();

    (cfg, ok)
}

/// Harness flags take the strconv.ParseBool tokens only; unset, `yes`, `on`
/// or anything else means verify certificates.
fn ssl_no_verify_from_env(raw: &str) -> bool {
    matches!(raw, "1" | "t" | "T" | "TRUE" | "true" | "True")
}

#[test]
fn test_ssl_no_verify_from_env() {
    for raw in ["1", "t", "T", "TRUE", "true", "True"] {
        assert!(ssl_no_verify_from_env(raw), "{raw}");
    }
    for raw in ["", "0", "false", "yes", "on", "YES", " true", "tRuE"] {
        assert!(!ssl_no_verify_from_env(raw), "{raw}");
    }
}

#[test]
fn test_new_cs_cloud() {
    let (cfg, ok) = config_from_env();
    if !ok {
        eprintln!("skipping: no CloudStack config found in environment");
        return;
    }

    if let Err(e) = CsCloud::new(cfg) {
        panic!("Failed to construct/authenticate CloudStack: {e}");
    }
}

#[tokio::test]
async fn test_load_balancer() {
    let (cfg, ok) = config_from_env();
    if !ok {
        eprintln!("skipping: no CloudStack config found in environment");
        return;
    }

    let cloud = CsCloud::new(cfg).expect("Failed to construct/authenticate CloudStack");
    let lb = cloud.load_balancer().expect("load_balancer() returned None");

    let status = lb
        .get_load_balancer(TEST_CLUSTER_NAME, &Service::new("noexist"))
        .await
        .unwrap_or_else(|e| panic!("get_load_balancer(\"noexist\") returned error: {e}"));

    assert!(status.is_none(), "get_load_balancer(\"noexist\") returned exists");
}
