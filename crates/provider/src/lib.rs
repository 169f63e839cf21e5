//! CloudStack cloud provider
//!
//! Turns a resolved [`config::CsConfig`] into an authenticated handle on the
//! CloudStack API and exposes the load-balancer capability the control plane
//! queries.

pub mod cloud;
pub mod load_balancer;

pub use cloud::*;
pub use load_balancer::*;
