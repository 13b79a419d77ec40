// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_PEBBLE_SOCKET_DIR: &str = "/charm/containers";
const STATE_FILE_NAME: &str = ".unit-state.json";

/// Operator process configuration loaded from the hook environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Hook or action being dispatched, e.g. `hooks/config-changed`
    pub dispatch_path: String,
    /// Model name, which is also the Kubernetes namespace of the workload
    pub model_name: String,
    pub app_name: String,
    pub charm_dir: PathBuf,
    pub pebble_socket_dir: PathBuf,
    pub state_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let dispatch_path = env::var("JUJU_DISPATCH_PATH")
            .context("JUJU_DISPATCH_PATH environment variable not set")?;
        let model_name =
            env::var("JUJU_MODEL_NAME").context("JUJU_MODEL_NAME environment variable not set")?;
        let unit_name =
            env::var("JUJU_UNIT_NAME").context("JUJU_UNIT_NAME environment variable not set")?;
        let charm_dir = env::var("JUJU_CHARM_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let pebble_socket_dir = env::var("PEBBLE_SOCKET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PEBBLE_SOCKET_DIR));
        let state_path = env::var("RANCHER_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| charm_dir.join(STATE_FILE_NAME));

        Ok(Config {
            dispatch_path,
            model_name,
            app_name: app_name_from_unit(&unit_name).to_string(),
            charm_dir,
            pebble_socket_dir,
            state_path,
        })
    }

    /// Path of the Pebble socket for the given workload container
    pub fn pebble_socket(&self, container: &str) -> PathBuf {
        self.pebble_socket_dir.join(container).join("pebble.socket")
    }
}

/// Unit names have the form `<application>/<number>`
fn app_name_from_unit(unit_name: &str) -> &str {
    unit_name.split('/').next().unwrap_or(unit_name)
}
