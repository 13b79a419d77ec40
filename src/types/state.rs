// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::CharmConfig;
use serde::{Deserialize, Serialize};

/// Snapshot of the workload settings taken when the unit first initialized.
///
/// Later configuration changes are not folded back into it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistedState {
    pub https_listen_port: u16,
    pub add_local: bool,
}

impl PersistedState {
    pub fn from_config(config: &CharmConfig) -> Self {
        Self {
            https_listen_port: config.https_listen_port,
            add_local: config.add_local,
        }
    }

    /// Keep a stored snapshot, or capture one from `config` if none exists.
    /// The flag is true when a new snapshot was captured and needs saving.
    pub fn initialize(stored: Option<Self>, config: &CharmConfig) -> (Self, bool) {
        match stored {
            Some(state) => (state, false),
            None => (Self::from_config(config), true),
        }
    }
}
