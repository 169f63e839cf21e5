//! Shared types for the CloudStack cloud provider
//!
//! This crate contains the domain types shared by the configuration resolver,
//! the CloudStack API client and the load-balancer capability.

pub mod cloudstack;
pub mod error;
pub mod service;

// Re-export commonly used types
pub use cloudstack::*;
pub use error::{CloudStackError, ConfigError, Result};
pub use service::*;
