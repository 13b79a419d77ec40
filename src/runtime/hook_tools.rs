// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Host runtime backed by Juju hook tools and a local state file

use crate::config::Config;
use crate::error::{RancherError, Result};
use crate::runtime::HostRuntime;
use crate::types::{ActionParams, ActionResult, CharmConfig, PersistedState, UnitStatus};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument};

pub struct JujuRuntime {
    model_name: String,
    state_path: PathBuf,
}

impl JujuRuntime {
    pub fn new(config: &Config) -> Self {
        Self {
            model_name: config.model_name.clone(),
            state_path: config.state_path.clone(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

/// Run a hook tool and return its stdout
#[instrument(skip(args))]
async fn run_tool(tool: &str, args: &[String]) -> Result<Vec<u8>> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .map_err(|e| RancherError::HookToolError {
            tool: tool.to_string(),
            message: if e.kind() == ErrorKind::NotFound {
                "not found, is this running inside a hook?".to_string()
            } else {
                e.to_string()
            },
        })?;

    if !output.status.success() {
        return Err(RancherError::HookToolError {
            tool: tool.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("{} exited successfully", tool);
    Ok(output.stdout)
}

/// Arguments of `action-set` for a result payload
fn action_set_args(payload: &std::collections::BTreeMap<String, String>) -> Vec<String> {
    payload
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

#[async_trait]
impl HostRuntime for JujuRuntime {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn charm_config(&self) -> Result<CharmConfig> {
        let stdout = run_tool("config-get", &["--format=json".to_string()]).await?;
        serde_json::from_slice(&stdout).map_err(|e| {
            RancherError::ConfigError(format!("Failed to parse config-get output: {}", e))
        })
    }

    async fn set_status(&self, status: &UnitStatus) -> Result<()> {
        run_tool(
            "status-set",
            &[status.name().to_string(), status.message().to_string()],
        )
        .await?;
        info!("Unit status set to {}", status.name());
        Ok(())
    }

    async fn load_state(&self) -> Result<Option<PersistedState>> {
        let contents = match tokio::fs::read(&self.state_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state at {}", self.state_path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(RancherError::StateError(format!(
                    "Failed to read {}: {}",
                    self.state_path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&contents).map(Some).map_err(|e| {
            RancherError::StateError(format!(
                "Failed to parse {}: {}",
                self.state_path.display(),
                e
            ))
        })
    }

    async fn save_state(&self, state: &PersistedState) -> Result<()> {
        let contents = serde_json::to_vec_pretty(state)?;

        // Replaced via rename, readers never see a partial file
        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
            RancherError::StateError(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| {
                RancherError::StateError(format!(
                    "Failed to replace {}: {}",
                    self.state_path.display(),
                    e
                ))
            })?;

        debug!("Saved state to {}", self.state_path.display());
        Ok(())
    }

    async fn action_params(&self) -> Result<ActionParams> {
        let stdout = run_tool("action-get", &["--format=json".to_string()]).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn respond(&self, result: &ActionResult) -> Result<()> {
        match result {
            ActionResult::Failed { message } => {
                run_tool("action-fail", &[message.clone()]).await?;
            }
            ActionResult::Succeeded(payload) => {
                run_tool("action-set", &action_set_args(payload)).await?;
            }
        }
        Ok(())
    }
}
