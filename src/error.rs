// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RancherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Pebble API error: {0}")]
    PebbleError(String),

    #[error("Hook tool '{tool}' failed: {message}")]
    HookToolError { tool: String, message: String },

    #[error("Persisted state error: {0}")]
    StateError(String),

    #[error("Invalid charm configuration: {0}")]
    ConfigError(String),

    #[error("Ingress update rejected: {0}")]
    IngressError(String),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RancherError>;
