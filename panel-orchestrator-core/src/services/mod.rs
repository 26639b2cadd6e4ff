//! Pipeline services

mod provisioning_service;

pub use provisioning_service::{ProvisioningService, RunOptions, RunReport};
