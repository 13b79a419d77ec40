// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// Desired configuration as reported by `config-get --format=json`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CharmConfig {
    #[serde(rename = "https-listen-port")]
    pub https_listen_port: u16,
    #[serde(rename = "add-local")]
    pub add_local: bool,
    /// Options without a default are omitted by the runtime when unset
    #[serde(default)]
    pub external_hostname: String,
}
