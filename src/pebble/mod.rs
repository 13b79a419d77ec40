// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload supervision through the Pebble API of the workload container.

pub mod client;

pub use client::PebbleClient;

use crate::error::Result;
use crate::types::Layer;
use async_trait::async_trait;

/// Supervisor of the services running in the workload container.
///
/// Both operations must be safe to repeat with identical arguments.
#[async_trait]
pub trait WorkloadSupervisor: Send + Sync {
    /// Add a layer under `label`. With `combine`, an existing layer of the
    /// same label is combined with it; services are replaced or merged
    /// according to their override policy and other services are kept.
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()>;

    /// Start every service with `startup: enabled` that is not running yet
    async fn autostart(&self) -> Result<()>;
}
