// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Minimal Pebble client speaking HTTP/1.1 over the container's unix socket

use crate::error::{RancherError, Result};
use crate::pebble::WorkloadSupervisor;
use crate::types::Layer;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::net::UnixStream;
use tracing::{debug, info, instrument};

/// Response envelope shared by all Pebble endpoints
#[derive(Deserialize, Debug)]
pub struct PebbleResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    #[serde(rename = "status-code")]
    pub status_code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Value,
    /// Change id of asynchronous operations
    #[serde(default)]
    pub change: Option<String>,
}

impl PebbleResponse {
    /// Turn an error envelope into an error carrying the server's message
    fn into_result(self) -> Result<Self> {
        if self.response_type != "error" && (200..300).contains(&self.status_code) {
            return Ok(self);
        }

        let message = self
            .result
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.status.clone());

        Err(RancherError::PebbleError(format!(
            "{} ({})",
            message, self.status_code
        )))
    }
}

pub struct PebbleClient {
    socket_path: PathBuf,
}

impl PebbleClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<PebbleResponse> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            RancherError::PebbleError(format!(
                "Failed to connect to {}: {}",
                self.socket_path.display(),
                e
            ))
        })?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| RancherError::PebbleError(format!("Handshake failed: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("Pebble connection closed with error: {}", e);
            }
        });

        let payload = match body {
            Some(value) => Bytes::from(serde_json::to_vec(&value)?),
            None => Bytes::new(),
        };

        let request = Request::builder()
            .method(method.clone())
            .uri(path)
            .header(header::HOST, "localhost")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(payload))
            .map_err(|e| RancherError::PebbleError(format!("Invalid request: {}", e)))?;

        debug!("Pebble request: {} {}", method, path);

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| RancherError::PebbleError(format!("{} {} failed: {}", method, path, e)))?;

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RancherError::PebbleError(format!("Failed to read response: {}", e)))?
            .to_bytes();

        let envelope: PebbleResponse = serde_json::from_slice(&bytes)?;
        envelope.into_result()
    }

    /// Block until the change finishes, failing if it reported an error
    #[instrument(skip(self))]
    async fn wait_change(&self, change_id: &str) -> Result<()> {
        let response = self
            .request(Method::GET, &format!("/v1/changes/{}/wait", change_id), None)
            .await?;

        match response.result.get("err").and_then(Value::as_str) {
            Some(err) if !err.is_empty() => Err(RancherError::PebbleError(format!(
                "Change {} failed: {}",
                change_id, err
            ))),
            _ => {
                debug!("Change {} is ready", change_id);
                Ok(())
            }
        }
    }
}

/// Body of a `POST /v1/layers` request
pub fn add_layer_body(label: &str, layer_yaml: &str, combine: bool) -> Value {
    json!({
        "action": "add",
        "combine": combine,
        "label": label,
        "format": "yaml",
        "layer": layer_yaml,
    })
}

#[async_trait]
impl WorkloadSupervisor for PebbleClient {
    #[instrument(skip(self, layer), fields(socket = %self.socket_path.display()))]
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()> {
        let body = add_layer_body(label, &layer.to_yaml()?, combine);
        self.request(Method::POST, "/v1/layers", Some(body)).await?;

        info!("Added layer '{}' (combine={})", label, combine);
        Ok(())
    }

    #[instrument(skip(self), fields(socket = %self.socket_path.display()))]
    async fn autostart(&self) -> Result<()> {
        let body = json!({ "action": "autostart", "services": [] });
        let response = self.request(Method::POST, "/v1/services", Some(body)).await?;

        match response.change {
            Some(change_id) => self.wait_change(&change_id).await?,
            None => debug!("Autostart returned no change to wait for"),
        }

        info!("Autostarted enabled services");
        Ok(())
    }
}
