// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access to the host runtime that delivers events to the operator.

pub mod hook_tools;

pub use hook_tools::JujuRuntime;

use crate::error::Result;
use crate::types::{ActionParams, ActionResult, CharmConfig, PersistedState, UnitStatus};
use async_trait::async_trait;

#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Name of the model the unit is deployed in
    fn model_name(&self) -> &str;

    async fn charm_config(&self) -> Result<CharmConfig>;

    async fn set_status(&self, status: &UnitStatus) -> Result<()>;

    /// Persisted state, or `None` before the first save
    async fn load_state(&self) -> Result<Option<PersistedState>>;

    async fn save_state(&self, state: &PersistedState) -> Result<()>;

    /// Parameters of the action being run
    async fn action_params(&self) -> Result<ActionParams>;

    /// Report the outcome of the action being run
    async fn respond(&self, result: &ActionResult) -> Result<()>;
}
