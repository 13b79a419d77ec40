// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::ingress::{DEFAULT_SERVICE_PORT, SERVICE_HOSTNAME, SERVICE_NAME, SERVICE_PORT};
use crate::error::{RancherError, Result};
use crate::types::CharmConfig;
use std::collections::BTreeMap;

/// Desired routing of the ingress in front of the workload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressFields {
    /// Empty when no external hostname is configured
    pub service_hostname: String,
    pub service_name: String,
    pub service_port: i32,
}

impl IngressFields {
    /// Fields the ingress collaborator is constructed with
    pub fn initial(config: &CharmConfig, service_name: &str) -> Self {
        Self {
            service_hostname: config.external_hostname.clone(),
            service_name: service_name.to_string(),
            service_port: DEFAULT_SERVICE_PORT,
        }
    }

    /// Copy of these fields with `updates` applied.
    /// Unknown keys and non-integer ports are rejected.
    pub fn merged(&self, updates: &BTreeMap<String, String>) -> Result<Self> {
        let mut fields = self.clone();

        for (key, value) in updates {
            match key.as_str() {
                SERVICE_HOSTNAME => fields.service_hostname = value.clone(),
                SERVICE_NAME => fields.service_name = value.clone(),
                SERVICE_PORT => {
                    fields.service_port = value.parse().map_err(|_| {
                        RancherError::IngressError(format!(
                            "{} must be an integer, got '{}'",
                            SERVICE_PORT, value
                        ))
                    })?
                }
                other => {
                    return Err(RancherError::IngressError(format!(
                        "unknown ingress field '{}'",
                        other
                    )))
                }
            }
        }

        Ok(fields)
    }
}
