// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::workload;
use crate::types::CharmConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A Pebble configuration layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub summary: String,
    pub description: String,
    pub services: BTreeMap<String, Service>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Service {
    #[serde(rename = "override")]
    pub override_policy: Override,
    pub summary: String,
    pub command: String,
    pub startup: Startup,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    Disabled,
}

/// How a service definition combines with one of the same name in an earlier layer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    Replace,
    Merge,
}

impl Layer {
    /// Build the layer running rancher with the given settings
    pub fn rancher(config: &CharmConfig, model_name: &str) -> Self {
        let service = Service {
            override_policy: Override::Replace,
            summary: workload::NAME.to_string(),
            command: rancher_command(config),
            startup: Startup::Enabled,
            environment: BTreeMap::from([
                (workload::env::NAMESPACE.to_string(), model_name.to_string()),
                (
                    workload::env::PEER_SERVICE.to_string(),
                    workload::NAME.to_string(),
                ),
                (workload::env::TINI_SUBREAPER.to_string(), "true".to_string()),
            ]),
        };

        Layer {
            summary: workload::LAYER_SUMMARY.to_string(),
            description: workload::LAYER_DESCRIPTION.to_string(),
            services: BTreeMap::from([(workload::NAME.to_string(), service)]),
        }
    }

    pub fn to_yaml(&self) -> crate::error::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Command line of the rancher service; booleans render as `true`/`false`
pub fn rancher_command(config: &CharmConfig) -> String {
    format!(
        "{} --https-listen-port={} --add-local={}",
        workload::ENTRYPOINT,
        config.https_listen_port,
        config.add_local
    )
}
