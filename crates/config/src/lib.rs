//! Cloud-config resolution for the CloudStack provider
//!
//! This crate parses the INI cloud-config file, fills missing credentials
//! from the environment and validates the result before the provider is
//! constructed.

pub mod env;
pub mod ini;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{EnvSource, ProcessEnv, ENV_API_KEY, ENV_API_URL, ENV_SECRET_KEY};
pub use loader::ConfigLoader;
pub use schema::*;
pub use validation::*;
