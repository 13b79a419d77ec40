// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes side of the operator: the Ingress in front of the workload.

pub mod ingress;

pub use ingress::{IngressRequires, KubeIngressProvider};

use crate::error::Result;
use crate::types::CharmConfig;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Collaborator that routes external traffic to the workload
#[async_trait]
pub trait IngressCollaborator: Send + Sync {
    /// Update some of the ingress fields (`service-hostname`, `service-name`,
    /// `service-port`). Repeating an update that changes nothing writes nothing.
    async fn update_config(&self, fields: &BTreeMap<String, String>) -> Result<()>;
}

/// Builds the ingress collaborator when an event first needs it
#[async_trait]
pub trait IngressProvider: Send + Sync {
    type Ingress: IngressCollaborator;

    /// Connect with initial fields derived from `config`
    async fn connect(&self, config: &CharmConfig) -> Result<Self::Ingress>;
}
